// Wire shape tests for the live agent protocol
//
// Outbound messages must serialize to the camelCase shapes the agent
// expects; inbound parsing must tolerate any subset of optional fields.

use sona_meet::protocol::messages::{
    ClientContentMessage, RealtimeInputMessage, ServerMessage, Setup, SetupMessage,
};

#[test]
fn test_setup_message_shape() {
    let setup = Setup::new("models/test-live", "Puck", "You are concise.");
    let json = serde_json::to_value(SetupMessage { setup }).expect("serialize");

    assert_eq!(json["setup"]["model"], "models/test-live");
    assert_eq!(
        json["setup"]["generationConfig"]["responseModalities"][0],
        "AUDIO"
    );
    assert_eq!(
        json["setup"]["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]
            ["voiceName"],
        "Puck"
    );
    assert_eq!(
        json["setup"]["systemInstruction"]["parts"][0]["text"],
        "You are concise."
    );
    // Empty objects switch transcription on for both directions.
    assert!(json["setup"]["inputAudioTranscription"].is_object());
    assert!(json["setup"]["outputAudioTranscription"].is_object());
}

#[test]
fn test_realtime_input_shape() {
    let msg = RealtimeInputMessage::media("audio/pcm;rate=16000", "AAAA");
    let json = serde_json::to_value(msg).expect("serialize");

    let chunk = &json["realtimeInput"]["mediaChunks"][0];
    assert_eq!(chunk["mimeType"], "audio/pcm;rate=16000");
    assert_eq!(chunk["data"], "AAAA");
}

#[test]
fn test_client_content_is_a_complete_user_turn() {
    let msg = ClientContentMessage::user_turn("hello agent");
    let json = serde_json::to_value(msg).expect("serialize");

    assert_eq!(json["clientContent"]["turnComplete"], true);
    assert_eq!(json["clientContent"]["turns"][0]["role"], "user");
    assert_eq!(
        json["clientContent"]["turns"][0]["parts"][0]["text"],
        "hello agent"
    );
}

#[test]
fn test_server_message_with_all_fields() {
    let raw = r#"{
        "serverContent": {
            "modelTurn": {
                "parts": [
                    { "inlineData": { "mimeType": "audio/pcm;rate=24000", "data": "AAE=" } },
                    { "text": "ignored by the audio path" }
                ]
            },
            "inputTranscription": { "text": "user said" },
            "outputTranscription": { "text": "agent said" },
            "turnComplete": true
        }
    }"#;

    let msg: ServerMessage = serde_json::from_str(raw).expect("parse");
    let content = msg.server_content.expect("server content present");

    let model_turn = content.model_turn.expect("model turn present");
    assert_eq!(model_turn.parts.len(), 2);
    let inline = model_turn.parts[0].inline_data.as_ref().expect("inline data");
    assert_eq!(inline.mime_type, "audio/pcm;rate=24000");
    assert_eq!(
        content.input_transcription.unwrap().text.as_deref(),
        Some("user said")
    );
    assert_eq!(
        content.output_transcription.unwrap().text.as_deref(),
        Some("agent said")
    );
    assert!(content.turn_complete);
}

#[test]
fn test_server_message_with_no_fields() {
    let msg: ServerMessage = serde_json::from_str("{}").expect("parse");
    assert!(msg.server_content.is_none());
    assert!(msg.setup_complete.is_none());
}

#[test]
fn test_server_message_turn_complete_defaults_false() {
    let raw = r#"{ "serverContent": { "outputTranscription": { "text": "partial" } } }"#;
    let msg: ServerMessage = serde_json::from_str(raw).expect("parse");
    assert!(!msg.server_content.unwrap().turn_complete);
}

#[test]
fn test_server_message_ignores_unknown_fields() {
    let raw = r#"{ "setupComplete": {}, "usageMetadata": { "totalTokens": 12 } }"#;
    let msg: ServerMessage = serde_json::from_str(raw).expect("parse");
    assert!(msg.setup_complete.is_some());
}
