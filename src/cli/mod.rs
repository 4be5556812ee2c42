use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Store Args ---
    /// Store backend for users and chats (json, memory)
    #[arg(long, env = "STORE_TYPE", default_value = "json")]
    pub store_type: String,

    /// Path of the JSON document holding chat history for all users.
    #[arg(long, env = "CHAT_FILE", default_value = "chats.json")]
    pub chat_file: String,

    /// Path of the JSON document holding user credentials.
    #[arg(long, env = "USER_FILE", default_value = "users.json")]
    pub user_file: String,

    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for chat completion (ollama)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "ollama")]
    pub chat_llm_type: String,

    /// Base URL for the Chat LLM provider API (e.g., http://localhost:11434 for Ollama)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, let adapters handle defaults if None
    pub chat_base_url: Option<String>,

    /// Model name for chat completion (e.g., llama3.2, mistral)
    #[arg(long, env = "CHAT_MODEL")] // No default, rely on adapter defaults if None
    pub chat_model: Option<String>,

    // --- OCR Args ---
    /// Tesseract executable used for text extraction.
    #[arg(long, env = "TESSERACT_CMD", default_value = "tesseract")]
    pub tesseract_cmd: String,

    /// Tesseract language(s), e.g. "eng" or "eng+deu". Tesseract's default when unset.
    #[arg(long, env = "OCR_LANG")]
    pub ocr_lang: Option<String>,

    // --- General App Args ---
    /// Minimum password length enforced at sign-up.
    #[arg(long, env = "MIN_PASSWORD_LEN", default_value = "6")]
    pub min_password_len: usize,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_files() {
        let args = Args::try_parse_from(["ocr-chat"]).unwrap();
        assert_eq!(args.store_type, "json");
        assert_eq!(args.chat_file, "chats.json");
        assert_eq!(args.user_file, "users.json");
        assert_eq!(args.chat_llm_type, "ollama");
        assert_eq!(args.min_password_len, 6);
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "ocr-chat",
            "--store-type",
            "memory",
            "--chat-model",
            "mistral",
            "--ocr-lang",
            "eng",
        ]).unwrap();
        assert_eq!(args.store_type, "memory");
        assert_eq!(args.chat_model.as_deref(), Some("mistral"));
        assert_eq!(args.ocr_lang.as_deref(), Some("eng"));
    }
}
