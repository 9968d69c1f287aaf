use crate::types::MediaKind;

pub const DEFAULT_AUDIO_COMMAND: &str = "No specific command provided. Please transcribe the audio, \
identify the main intent, and list any required actions.";

pub const DEFAULT_FILE_COMMAND: &str = "No specific command provided. Please scan the file and \
provide a concise summary of the contents you processed.";

pub const NO_TEXT_DETECTED: &str = "(No text detected)";

/// User turn sent to the model after an attachment was analyzed
pub fn compose_attachment_prompt(
    kind: MediaKind,
    command: Option<&str>,
    file_name: Option<&str>,
    extracted_text: Option<&str>,
) -> String {
    let (label, source, default_command) = match kind {
        MediaKind::Audio => ("Audio", "transcription", DEFAULT_AUDIO_COMMAND),
        MediaKind::Document => ("File", "extracted text", DEFAULT_FILE_COMMAND),
    };

    let command = command.map(str::trim).filter(|c| !c.is_empty()).unwrap_or(default_command);
    let file_name = file_name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or("an uploaded file");
    let text = extracted_text.filter(|t| !t.is_empty()).unwrap_or(NO_TEXT_DETECTED);

    format!(
        "{} command: {}\n\nHere is the {} from {}:\n\n{}",
        label, command, source, file_name, text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_prompt() {
        let prompt = compose_attachment_prompt(
            MediaKind::Document,
            Some("  list the totals "),
            Some("invoice.pdf"),
            Some("Total: 42"),
        );
        assert_eq!(
            prompt,
            "File command: list the totals\n\nHere is the extracted text from invoice.pdf:\n\nTotal: 42"
        );
    }

    #[test]
    fn test_audio_prompt_uses_defaults() {
        let prompt = compose_attachment_prompt(MediaKind::Audio, Some(" "), None, None);
        assert!(prompt.starts_with(&format!("Audio command: {}", DEFAULT_AUDIO_COMMAND)));
        assert!(prompt.contains("Here is the transcription from an uploaded file:"));
        assert!(prompt.ends_with(NO_TEXT_DETECTED));
    }
}
