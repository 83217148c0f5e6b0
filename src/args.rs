use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "ai-review",
    version,
    about = "HTTP gateway that reviews uploaded source files with an AI provider"
)]
pub struct Args {
    /// 监听地址
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// 监听端口
    #[arg(long, default_value_t = 8080)]
    pub port: u16,

    /// AI provider to use (deepseek, siliconflow or ollama)
    #[arg(long, default_value = "")] // 空字符串表示未指定
    pub provider: String,

    /// Model to use (default: deepseek-chat)
    #[arg(short, long, default_value = "")] // 空字符串表示未指定
    pub model: String,

    /// 输出调试信息
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}
