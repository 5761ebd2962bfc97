use crate::view::UiUpdate;

/// Emit a UI update as a single JSON line to stdout.
pub fn report_update(update: &UiUpdate) {
    if let Ok(json) = serde_json::to_string(update) {
        println!("{json}");
    }
}

#[cfg(test)]
mod tests {
    use crate::view::UiUpdate;

    #[test]
    fn updates_are_single_line_json() {
        let json = serde_json::to_string(&UiUpdate::Clipboard {
            text: "0xabc".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"update":"clipboard","text":"0xabc"}"#);
        assert!(!json.contains('\n'));
    }
}
