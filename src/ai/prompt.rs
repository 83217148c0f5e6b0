use once_cell::sync::Lazy;
use std::env;
use std::fs;
use std::sync::RwLock;

// 提示模板缓存
static PROMPT_CACHE: Lazy<RwLock<Option<String>>> = Lazy::new(|| RwLock::new(None));

// 加载提示模板（仅执行一次）
fn load_prompt_template() -> String {
    let default_path = "review-prompt.txt";
    let prompt_path = if std::path::Path::new(default_path).exists() {
        default_path
    } else {
        // 如果项目中不存在，则检查环境变量配置
        &env::var("AI_REVIEW_PROMPT_PATH").unwrap_or_else(|_| default_path.to_owned())
    };

    // 尝试读取外部文件，失败则使用内置模板
    if std::path::Path::new(prompt_path).exists() {
        match fs::read_to_string(prompt_path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("无法读取提示词文件 {}: {}，使用内置模板", prompt_path, e);
                include_str!("../../review-prompt.txt").to_owned()
            }
        }
    } else {
        // 内置默认模板，编译时读取 review-prompt.txt
        include_str!("../../review-prompt.txt").to_owned()
    }
}

/// 构造审查提示：模板固定，仅插入文件名与源码文本
pub fn get_prompt(source_code: &str, file_name: &str) -> String {
    // 检查缓存
    {
        let cache = PROMPT_CACHE.read().unwrap();
        if let Some(ref template) = *cache {
            return template
                .replace("{{file_name}}", file_name)
                .replace("{{source_code}}", source_code);
        }
    }

    // 加载并缓存模板
    let template = load_prompt_template();
    *PROMPT_CACHE.write().unwrap() = Some(template.clone());

    template
        .replace("{{file_name}}", file_name)
        .replace("{{source_code}}", source_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_prompt_interpolates_code_and_filename() {
        let code = "def add(a, b):\n    return a + b";
        let prompt = get_prompt(code, "math_utils.py");

        assert!(prompt.contains("def add(a, b):"));
        assert!(prompt.contains("math_utils.py"));
        assert!(!prompt.contains("{{source_code}}"));
        assert!(!prompt.contains("{{file_name}}"));
    }

    #[test]
    fn test_get_prompt_keeps_instructions() {
        let prompt = get_prompt("print('hi')", "hello.py");

        // 模板的关键指令必须保留
        assert!(prompt.contains("readability"));
        assert!(prompt.contains("modularity"));
        assert!(prompt.contains("bugs"));
        assert!(prompt.contains("best_practices"));
        assert!(prompt.contains("security"));
        assert!(prompt.contains("JSON"));
    }

    #[test]
    fn test_get_prompt_empty_code() {
        let prompt = get_prompt("", "empty.txt");

        // 空源码不会导致错误，模板内容仍然存在
        assert!(!prompt.contains("{{source_code}}"));
        assert!(!prompt.is_empty());
    }

    #[test]
    fn test_get_prompt_multiple_calls_cached() {
        let prompt1 = get_prompt("first file", "a.rs");
        let prompt2 = get_prompt("second file", "b.rs");

        // 验证缓存工作正常
        assert!(prompt1.contains("first file"));
        assert!(prompt2.contains("second file"));
        assert!(prompt1.contains("a.rs"));
        assert!(prompt2.contains("b.rs"));
    }

    #[test]
    fn test_template_placeholder_replacement() {
        let template = "File {{file_name}} contains:\n{{source_code}}";
        let result = template
            .replace("{{file_name}}", "x.py")
            .replace("{{source_code}}", "CODE");

        assert_eq!(result, "File x.py contains:\nCODE");
    }

    #[test]
    fn test_prompt_cache_singleton() {
        let prompt1 = get_prompt("same code", "same.rs");

        // 验证缓存已设置
        {
            let cache = PROMPT_CACHE.read().unwrap();
            assert!(cache.is_some());
        }

        let prompt2 = get_prompt("same code", "same.rs");
        assert_eq!(prompt1, prompt2);
    }
}
