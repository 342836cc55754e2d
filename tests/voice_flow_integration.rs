//! End-to-end voice flows over scripted speech: onboarding with a photo,
//! then the assistant acting on spoken commands.

use std::sync::Arc;

use serde_json::Value;

use voice_bank::Assistant;
use voice_bank::camera::{NoCamera, StillImageCamera};
use voice_bank::config::{DispatchConfig, InterviewConfig, ListenConfig, SpeechConfig};
use voice_bank::dashboard::{ActionDispatcher, MASKED_BALANCE, Section};
use voice_bank::intent::IntentResolver;
use voice_bank::onboarding::{Disability, InterviewRunner, prompts};
use voice_bank::error::{OnboardingError, SpeechError};
use voice_bank::speech::{
    ConsoleInput, ContinuousListener, RecordingOutput, ScriptedInput, SpeechInput, Speaker,
};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];

fn speaker() -> (Speaker, Arc<RecordingOutput>) {
    let output = Arc::new(RecordingOutput::new());
    (Speaker::new(output.clone(), SpeechConfig::default()), output)
}

#[tokio::test]
async fn onboarding_with_rejection_and_photo_issues_qr() {
    let dir = tempfile::tempdir().unwrap();
    let photo = dir.path().join("face.png");
    std::fs::write(&photo, PNG_BYTES).unwrap();

    let input = ScriptedInput::new()
        .say("benim adım ayşe")
        .say("hayır")
        .say("ayşe")
        .say("evet")
        .say("soyadım demir")
        .say("evet")
        .say("67 yaşındayım")
        .say("evet")
        .say("görme engelliyim")
        .say("tamam");
    let (speaker, output) = speaker();
    let runner = InterviewRunner::new(
        Arc::new(input),
        speaker,
        Arc::new(StillImageCamera::new(&photo)),
        InterviewConfig::immediate(),
    );

    let record = runner.run().await.unwrap();
    assert_eq!(record.full_name(), "Ayşe Demir");
    assert_eq!(record.age, "67");
    assert_eq!(record.disability, Disability::Visual);
    assert!(record.needs_enlarged_controls());

    let image = record.image.as_ref().expect("photo captured");
    assert_eq!(image.mime, "image/png");
    assert_eq!(image.data, PNG_BYTES);
    assert!(image.to_data_url().starts_with("data:image/png;base64,"));

    let qr: Value = serde_json::from_str(&record.qr.to_json().unwrap()).unwrap();
    assert_eq!(qr["firstName"], "Ayşe");
    assert_eq!(qr["lastName"], "Demir");
    assert_eq!(qr["age"], "67");
    assert_eq!(qr["disability"], "Görme Engelli");
    assert!(qr["sessionId"].as_str().is_some_and(|id| id.len() == 36));
    assert!(qr["issuedAt"].as_str().is_some_and(|ts| ts.ends_with('Z')));

    let spoken = output.spoken();
    assert_eq!(spoken.first().map(String::as_str), Some(prompts::GREETING));
    assert!(spoken.contains(&"Anladım. Lütfen adınızı tekrar söyleyin.".to_string()));
    assert!(spoken.contains(&"Teşekkürler Ayşe Demir. Şimdi yaşınızı söyleyin.".to_string()));
    assert!(spoken.contains(&"Görme Engelli olarak kaydettim. Doğru mu?".to_string()));
    assert!(spoken.contains(&prompts::PHOTO_TAKING.to_string()));
    assert_eq!(spoken.last().map(String::as_str), Some(prompts::PHOTO_DONE));
}

#[tokio::test]
async fn missing_photo_file_still_completes_onboarding() {
    let dir = tempfile::tempdir().unwrap();
    let input = ScriptedInput::new()
        .say("can")
        .say("evet")
        .say("öz")
        .say("evet")
        .say("otuz")
        .say("evet")
        .say("yok")
        .say("evet");
    let (speaker, _) = speaker();
    let runner = InterviewRunner::new(
        Arc::new(input),
        speaker,
        Arc::new(StillImageCamera::new(dir.path().join("missing.png"))),
        InterviewConfig::immediate(),
    );

    let record = runner.run().await.unwrap();
    assert_eq!(record.full_name(), "Can Öz");
    assert_eq!(record.age, "30");
    assert_eq!(record.disability, Disability::None);
    assert!(record.image.is_none());
    assert!(!record.needs_enlarged_controls());
}

#[tokio::test(start_paused = true)]
async fn spoken_commands_drive_the_dashboard_after_registration() {
    let input = ScriptedInput::new()
        .say("kartlarım")
        .silence()
        .say("bakiyemi göster")
        .say("gizle");
    let (speaker, output) = speaker();
    let dispatcher = ActionDispatcher::new(speaker, DispatchConfig::default());
    let listener = ContinuousListener::new(Arc::new(input), ListenConfig::default());
    let mut assistant = Assistant::new(IntentResolver::local(), dispatcher, listener);

    let record = voice_bank::onboarding::OnboardingRecord::new(
        "Ayşe",
        "Demir",
        "40",
        Disability::None,
        None,
    );
    assistant.registration_completed(record);
    assert_eq!(
        output.spoken(),
        vec!["Kayıt tamamlandı. Dashboard'a yönlendiriliyorsunuz."]
    );

    let mut sections = Vec::new();
    assistant
        .run(|view| sections.push(view.active_section))
        .await
        .unwrap();

    assert!(sections.contains(&Section::Cards));
    let view = assistant.view();
    assert!(!view.balance_visible);
    assert_eq!(view.balance, MASKED_BALANCE);
    assert!(!assistant.is_listening());
    assert!(assistant.record().is_some());
}

#[tokio::test]
async fn input_ending_mid_interview_skips_to_dashboard() {
    let input: Arc<dyn SpeechInput> = Arc::new(ConsoleInput::from_reader(&b"ahmet\nevet\n"[..]));
    let (speaker, output) = speaker();
    let runner = InterviewRunner::new(
        input.clone(),
        speaker.clone(),
        Arc::new(NoCamera),
        InterviewConfig::immediate(),
    );

    let outcome = runner.run().await;
    assert!(matches!(
        outcome,
        Err(OnboardingError::Speech(SpeechError::InputClosed))
    ));

    let dispatcher = ActionDispatcher::new(speaker, DispatchConfig::default());
    let listener = ContinuousListener::new(input, ListenConfig::default());
    let mut assistant = Assistant::new(IntentResolver::local(), dispatcher, listener);
    assistant.finish_onboarding(outcome);

    assert!(assistant.record().is_none());
    assert_eq!(assistant.view().response_message, "Dashboard'a geçildi.");
    assert_eq!(
        output.spoken().last().map(String::as_str),
        Some("Dashboard'a geçildi.")
    );

    // Closed input ends the listening loop cleanly.
    assistant.run(|_| {}).await.unwrap();
    assert!(!assistant.is_listening());
}
