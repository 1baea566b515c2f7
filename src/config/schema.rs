//! The closed set of recognized configuration keys.
//!
//! Each dotted `section.key` maps to the environment variable name injected
//! into the launched container. Keys outside this table are ignored, not
//! errors. Secret-shaped keys are masked on every human-facing display path
//! and never masked before the real value reaches the launcher.

/// A recognized configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigKey {
    /// TOML table the key lives in (e.g. "llm")
    pub section: &'static str,
    /// Key name within the section (e.g. "model")
    pub name: &'static str,
    /// Environment variable the value is bound to
    pub target: &'static str,
    /// Whether the value is masked on display
    pub secret: bool,
}

impl ConfigKey {
    /// The dotted `section.key` form.
    pub fn dotted(&self) -> String {
        format!("{}.{}", self.section, self.name)
    }
}

/// The closed set of keys the resolver recognizes.
pub const RECOGNIZED_KEYS: &[ConfigKey] = &[
    ConfigKey { section: "llm", name: "model", target: "LLM_MODEL", secret: false },
    ConfigKey { section: "llm", name: "api_key", target: "LLM_API_KEY", secret: true },
    ConfigKey { section: "llm", name: "search_api_key", target: "SEARCH_API_KEY", secret: true },
    ConfigKey { section: "llm", name: "num_retries", target: "LLM_NUM_RETRIES", secret: false },
    ConfigKey { section: "llm", name: "retry_min_wait", target: "LLM_RETRY_MIN_WAIT", secret: false },
    ConfigKey { section: "llm", name: "retry_max_wait", target: "LLM_RETRY_MAX_WAIT", secret: false },
    ConfigKey { section: "llm", name: "timeout", target: "LLM_TIMEOUT", secret: false },
    ConfigKey { section: "llm", name: "temperature", target: "LLM_TEMPERATURE", secret: false },
    ConfigKey { section: "llm", name: "top_p", target: "LLM_TOP_P", secret: false },
    ConfigKey { section: "llm", name: "max_input_tokens", target: "LLM_MAX_INPUT_TOKENS", secret: false },
    ConfigKey { section: "llm", name: "max_output_tokens", target: "LLM_MAX_OUTPUT_TOKENS", secret: false },
    ConfigKey { section: "llm", name: "disable_vision", target: "LLM_DISABLE_VISION", secret: false },
    ConfigKey { section: "sandbox", name: "runtime_container_image", target: "SANDBOX_RUNTIME_CONTAINER_IMAGE", secret: false },
    ConfigKey { section: "sandbox", name: "enable_gpu", target: "SANDBOX_ENABLE_GPU", secret: false },
    ConfigKey { section: "sandbox", name: "volumes", target: "SANDBOX_VOLUMES", secret: false },
    ConfigKey { section: "sandbox", name: "user_id", target: "SANDBOX_USER_ID", secret: false },
    ConfigKey { section: "core", name: "max_iterations", target: "CORE_MAX_ITERATIONS", secret: false },
    ConfigKey { section: "core", name: "max_budget_per_task", target: "CORE_MAX_BUDGET_PER_TASK", secret: false },
    ConfigKey { section: "agent", name: "enable_cli", target: "AGENT_ENABLE_CLI", secret: false },
    ConfigKey { section: "agent", name: "enable_browsing_delegate", target: "AGENT_ENABLE_BROWSING_DELEGATE", secret: false },
    ConfigKey { section: "security", name: "confirmation_mode", target: "SECURITY_CONFIRMATION_MODE", secret: false },
    ConfigKey { section: "security", name: "security_level", target: "SECURITY_LEVEL", secret: false },
];

/// Look up a recognized key by its target environment variable name.
pub fn key_for_target(target: &str) -> Option<&'static ConfigKey> {
    RECOGNIZED_KEYS.iter().find(|k| k.target == target)
}

/// Whether the given target environment variable holds a secret-shaped value.
pub fn is_secret_target(target: &str) -> bool {
    key_for_target(target).is_some_and(|k| k.secret)
}

/// Coerce a scalar TOML value to its environment-variable string form.
///
/// Booleans serialize to the literal strings `true`/`false`. Non-scalar
/// values (tables, arrays) yield `None` and are ignored by the resolver.
pub fn scalar_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(if *b { "true" } else { "false" }.to_string()),
        _ => None,
    }
}

/// Mask a secret value for display.
///
/// Values longer than 12 characters show a four-character prefix and suffix;
/// anything shorter is replaced wholesale with an opaque placeholder.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 12 {
        "********".to_string()
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}
