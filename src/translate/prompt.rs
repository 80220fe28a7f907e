/// Instruction sent with every captured image.
pub fn translation_prompt(target_language: &str) -> String {
    format!(
        "You are a professional translator tasked with converting text in this image into \
         fluent, natural {lang}. Extract all visible text from the image and translate it with \
         precision, using {lang} idioms, formal native structures, and a refined literary tone. \
         Preserve the original text formatting as much as possible, including paragraph \
         structure and any visible formatting. Provide only the translated content without any \
         additional comments or explanations.",
        lang = target_language
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_target_language() {
        let prompt = translation_prompt("French");
        assert!(prompt.contains("fluent, natural French."));
        assert!(prompt.contains("using French idioms"));
        assert!(prompt.contains("paragraph structure"));
        assert!(!prompt.contains("{lang}"));
    }
}
