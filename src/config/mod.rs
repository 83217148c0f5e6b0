use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub provider: String,
    pub model: String,
    pub deepseek_api_key: Option<String>,
    pub deepseek_url: String,
    pub siliconflow_api_key: Option<String>,
    pub siliconflow_url: String,
    pub ollama_url: String,
    /// 上游请求超时（秒），防止慢上游无限占用请求
    pub request_timeout_secs: u64,
    pub debug: bool,
}

impl Config {
    pub fn new() -> Self {
        // 默认配置
        let mut config = Config {
            provider: "deepseek".to_string(),
            model: "deepseek-chat".to_string(),
            deepseek_api_key: None,
            deepseek_url: "https://api.deepseek.com/v1/chat/completions".to_string(),
            siliconflow_api_key: None,
            siliconflow_url: "https://api.siliconflow.cn/v1/chat/completions".to_string(),
            ollama_url: "http://localhost:11434/api/generate".to_string(),
            request_timeout_secs: 60,
            debug: false,
        };

        // 加载配置文件
        #[cfg(not(test))]
        config.load_from_env_file();
        // 加载环境变量（覆盖配置文件）
        config.load_from_env();

        config
    }

    pub fn load_from_env_file(&mut self) {
        // 尝试从用户主目录加载
        if let Ok(home) = env::var("HOME") {
            let user_env_path = PathBuf::from(format!("{}/.ai-review/.env", home));
            if user_env_path.exists() {
                dotenvy::from_path(user_env_path).ok();
            }
        }

        // 尝试从当前目录加载
        dotenvy::dotenv().ok();
    }

    pub fn load_from_env(&mut self) {
        if let Ok(provider) = env::var("AI_REVIEW_PROVIDER") {
            self.provider = provider;
        }
        if let Ok(model) = env::var("AI_REVIEW_MODEL") {
            self.model = model;
        }
        if let Ok(api_key) = env::var("AI_REVIEW_DEEPSEEK_API_KEY") {
            self.deepseek_api_key = Some(api_key);
        }
        if let Ok(url) = env::var("AI_REVIEW_DEEPSEEK_URL") {
            self.deepseek_url = url;
        }
        if let Ok(api_key) = env::var("AI_REVIEW_SILICONFLOW_API_KEY") {
            self.siliconflow_api_key = Some(api_key);
        }
        if let Ok(url) = env::var("AI_REVIEW_SILICONFLOW_URL") {
            self.siliconflow_url = url;
        }
        if let Ok(url) = env::var("AI_REVIEW_OLLAMA_URL") {
            self.ollama_url = url;
        }
        if let Ok(timeout) = env::var("AI_REVIEW_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                self.request_timeout_secs = secs;
            }
        }
        if let Ok(debug) = env::var("AI_REVIEW_DEBUG") {
            self.debug = debug == "1" || debug.eq_ignore_ascii_case("true");
        }
    }

    pub fn update_from_args(&mut self, args: &crate::args::Args) {
        // 命令行参数优先级最高
        if !args.provider.is_empty() {
            self.provider = args.provider.clone();
        }
        if !args.model.is_empty() {
            self.model = args.model.clone();
        }
        if args.debug {
            self.debug = true;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// 验证配置的有效性：缺少 API key 属于启动期致命错误，而非请求期错误
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.provider.as_str() {
            "deepseek" => {
                if self.deepseek_api_key.is_none() {
                    anyhow::bail!("Deepseek API key is required but not set. Please set AI_REVIEW_DEEPSEEK_API_KEY environment variable or in .env file");
                }
            }
            "siliconflow" => {
                if self.siliconflow_api_key.is_none() {
                    anyhow::bail!("SiliconFlow API key is required but not set. Please set AI_REVIEW_SILICONFLOW_API_KEY environment variable or in .env file");
                }
            }
            "ollama" => {
                // Ollama 使用本地服务，不需要 API key
            }
            _ => {
                anyhow::bail!("Unsupported provider: {}", self.provider);
            }
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("AI_REVIEW_TIMEOUT_SECS must be greater than 0");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
