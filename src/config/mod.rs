use crate::core::error::{RewriteError, RewriteResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub log: LogConfig,
    pub analysis: AnalysisConfig,
}

/// 日志配置，供 `utils::logging::init` 使用
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub dir: String,
    pub file: String,
    pub max_file_size: u64,
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "logs".to_string(),
            file: "fedquery".to_string(),
            max_file_size: 100 * 1024 * 1024, // 100MB
            max_files: 5,
        }
    }
}

/// 改写与分析组件的默认行为
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 是否进入嵌套命令
    pub deep_traversal: bool,
    /// 收集器是否去重
    pub remove_duplicates: bool,
    /// 替换时是否复制映射值
    pub clone_on_substitute: bool,
    /// 投影名称变化时是否补充别名
    pub create_aliases: bool,
    /// 包装非符号替换值时使用的名称
    pub expression_symbol_name: String,
    /// 条件翻译中引用改名使用的组名
    pub input_group_name: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            deep_traversal: true,
            remove_duplicates: true,
            clone_on_substitute: true,
            create_aliases: true,
            expression_symbol_name: "expr".to_string(),
            input_group_name: "$INPUT".to_string(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> RewriteResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RewriteError::Config(format!("无法读取配置文件 {}: {}", path.as_ref().display(), e))
        })?;
        let config: Config =
            toml::from_str(&content).map_err(|e| RewriteError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> RewriteResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| RewriteError::Config(e.to_string()))?;
        fs::write(path, content).map_err(|e| RewriteError::Config(e.to_string()))?;
        Ok(())
    }

    fn validate(&self) -> RewriteResult<()> {
        if self.analysis.expression_symbol_name.is_empty() {
            return Err(RewriteError::Config("expression_symbol_name 不能为空".into()));
        }
        if self.analysis.input_group_name.is_empty() {
            return Err(RewriteError::Config("input_group_name 不能为空".into()));
        }
        Ok(())
    }
}
