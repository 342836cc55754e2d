//! Spoken Turkish prompts for the onboarding interview.

use super::state::Field;

pub const GREETING: &str =
    "Merhaba, Engelli Bankacılık sistemine hoş geldiniz. Lütfen adınızı söyleyin.";
pub const NO_SPEECH: &str = "Sizi duyamadım. Lütfen yüksek sesle tekrar söyleyin.";
pub const RECOGNITION_UNSUPPORTED: &str = "Tarayıcınız konuşmayı tanımayı desteklemiyor.";
pub const PHOTO_ANNOUNCE: &str = "Mükemmel. Şimdi fotoğrafınızı çekeceğim.";
pub const PHOTO_TAKING: &str = "Fotoğrafınız çekiliyor.";
pub const PHOTO_DONE: &str =
    "Fotoğraf çekildi. QR kodunuz hazır. Dashboard'a yönlendiriliyorsunuz.";

const AFFIRMATIVE_WORDS: &[&str] = &["evet", "tamam"];

/// Whether an answer to a confirmation question means "yes".
pub fn is_affirmative(text: &str) -> bool {
    let lower = text.to_lowercase();
    AFFIRMATIVE_WORDS.iter().any(|w| lower.contains(w))
}

/// Read back an extracted value and ask for confirmation.
pub fn confirm_prompt(field: Field, value: &str) -> String {
    match field {
        Field::FirstName | Field::LastName => {
            format!("{value} olarak kaydettim. Doğru mu? Evet veya Hayır deyin.")
        }
        Field::Age => format!("{value} yaş olarak kaydettim. Doğru mu?"),
        Field::Disability => format!("{value} olarak kaydettim. Doğru mu?"),
    }
}

/// Ask for a field again after the user rejected the value.
pub fn retry_prompt(field: Field) -> String {
    let what = match field {
        Field::FirstName => "adınızı",
        Field::LastName => "soyadınızı",
        Field::Age => "yaşınızı",
        Field::Disability => "engel türünüzü",
    };
    format!("Anladım. Lütfen {what} tekrar söyleyin.")
}

/// Thank the user for a confirmed field and ask the next question.
pub fn accepted_prompt(field: Field, first_name: &str, last_name: &str) -> String {
    match field {
        Field::FirstName => "Teşekkürler. Şimdi soyadınızı söyleyin.".to_string(),
        Field::LastName => {
            format!("Teşekkürler {first_name} {last_name}. Şimdi yaşınızı söyleyin.")
        }
        Field::Age => "Teşekkürler. Şimdi engel türünüzü söyleyin. Eğer engeliniz yoksa 'yok' deyin."
            .to_string(),
        Field::Disability => PHOTO_ANNOUNCE.to_string(),
    }
}
