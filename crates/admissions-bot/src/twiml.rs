//! TwiML messaging replies.
//!
//! Twilio expects the webhook response body to be a `<Response>` document; each
//! `<Message>` element is sent back to the sender as one chat message.

use quick_xml::escape::escape;

pub const CONTENT_TYPE: &str = "application/xml";

/// Wrap `text` in a single-message TwiML document.
///
/// Characters that XML 1.0 cannot carry at all (most C0 controls, U+FFFE, U+FFFF) are
/// dropped before escaping.
pub fn message_response(text: &str) -> String {
    let text: String = text.chars().filter(|&c| is_xml_char(c)).collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        escape(&text)
    )
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= '\u{20}' && c != '\u{FFFE}' && c != '\u{FFFF}')
}
