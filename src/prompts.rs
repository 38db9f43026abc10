//! Prompt text for screen help generation.
//!
//! All wording the model sees lives here so a prompt change never touches
//! request plumbing in [`crate::pipeline::llm`]. Callers can replace the
//! system instruction via [`crate::config::HelpConfig::system_prompt`]; the
//! user message layout is fixed.

/// Marker line placed before the forwarded FRD text.
pub const FRD_START_MARKER: &str = "----- FRD START -----";

/// Marker line placed after the forwarded FRD text.
pub const FRD_END_MARKER: &str = "----- FRD END -----";

/// Default system instruction: role, inputs, and the required output sections.
pub const SYSTEM_INSTRUCTION: &str = "You are an assistant that writes detailed, user-friendly help text for a banking web application. \
You will be given:
1) Functional requirement text (FRD) of the module.
2) A screenshot of a specific screen.

You must:
- Identify all visible fields, dropdowns, buttons, sections, and labels from the screenshot.
- Use the FRD text to understand behavior, validations, and purpose.
- Generate help text ONLY for this screen.
- Use clear, concise language.
- Output in HTML that can be pasted into Confluence.
- Include sections like: Overview, Field Descriptions (in a table), Buttons/Actions, Validation & Error Messages, Tips.
";

/// Build the text part of the user message.
///
/// `frd_text` must already be truncated; it is framed verbatim between
/// [`FRD_START_MARKER`] and [`FRD_END_MARKER`].
pub fn screen_user_text(screen_name: &str, frd_text: &str) -> String {
    format!(
        "Screen name: {screen_name}\n\n\
         Here is the functional requirement text (FRD) for this module:\n\
         {FRD_START_MARKER}\n\
         {frd_text}\n\
         {FRD_END_MARKER}\n\n\
         Now analyze the attached screenshot image of this screen and generate the full help text \
         for this screen in HTML suitable for Confluence."
    )
}
