// src/config.rs

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::dictionary_utils::normalize_word;
use crate::name_guard::PlaceholderFormat;

/// 内置默认规则（随程序分发）
const BUILTIN_RULES_JSON: &str = include_str!("../rules/name_guard.json");

pub const CONFIG_DIR_NAME: &str = "NameGuard";
pub const CONFIG_FILENAME: &str = "name_guard.json";

/// 默认边界字符（标点 + 空白）
pub const DEFAULT_BOUNDARY_CHARS: &str = "，。！？、；：…～,.!?;:~ \t\n";

// ============================================================================
// 策略配置
// ============================================================================

/// 全局策略：阈值、强信号闸门、占位符格式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// 判定为人名所需的最低分数
    #[serde(default = "default_threshold")]
    pub threshold: i32,
    /// 是否必须命中至少一个强信号（闸门 2）
    #[serde(default = "default_require_strong_signal")]
    pub require_strong_signal: bool,
    /// 占位符格式，`{index}` 或 `{}` 处替换为从 0 开始的序号
    #[serde(default = "default_placeholder_format")]
    pub name_placeholder_format: String,
}

fn default_threshold() -> i32 {
    100
}

fn default_require_strong_signal() -> bool {
    true
}

fn default_placeholder_format() -> String {
    "<<NAME_{index}>>".to_string()
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            require_strong_signal: default_require_strong_signal(),
            name_placeholder_format: default_placeholder_format(),
        }
    }
}

// ============================================================================
// 打分规则配置
// ============================================================================

fn default_enabled() -> bool {
    true
}

/// 禁用的规则权重视为 0
fn effective_weight(enabled: bool, weight: i32) -> i32 {
    if enabled {
        weight
    } else {
        0
    }
}

/// 称呼前后缀规则（X哥 / 老X）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HonorificRule {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_honorific_weight")]
    pub weight: i32,
    /// 后缀称呼（哥、姐、师傅...）
    #[serde(default)]
    pub suffix_patterns: Vec<String>,
    /// 前缀称呼（老、小、阿）
    #[serde(default = "default_prefix_patterns")]
    pub prefix_patterns: Vec<String>,
}

fn default_honorific_weight() -> i32 {
    100
}

fn default_prefix_patterns() -> Vec<String> {
    vec!["老".to_string(), "小".to_string(), "阿".to_string()]
}

impl Default for HonorificRule {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            weight: default_honorific_weight(),
            suffix_patterns: Vec::new(),
            prefix_patterns: default_prefix_patterns(),
        }
    }
}

impl HonorificRule {
    pub fn effective_weight(&self) -> i32 {
        effective_weight(self.enabled, self.weight)
    }
}

/// 呼唤位规则（utterance 开头或 <sep> 后首个 token）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallPositionRule {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_call_position_weight")]
    pub weight: i32,
}

fn default_call_position_weight() -> i32 {
    80
}

impl Default for CallPositionRule {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            weight: default_call_position_weight(),
        }
    }
}

impl CallPositionRule {
    pub fn effective_weight(&self) -> i32 {
        effective_weight(self.enabled, self.weight)
    }
}

/// 重复出现规则
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepetitionRule {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_repetition_weight")]
    pub weight: i32,
    /// 在全文中出现次数达到此值才算重复
    #[serde(default = "default_min_occurrences")]
    pub min_occurrences: usize,
}

fn default_repetition_weight() -> i32 {
    40
}

fn default_min_occurrences() -> usize {
    2
}

impl Default for RepetitionRule {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            weight: default_repetition_weight(),
            min_occurrences: default_min_occurrences(),
        }
    }
}

impl RepetitionRule {
    pub fn effective_weight(&self) -> i32 {
        effective_weight(self.enabled, self.weight)
    }
}

/// 词性排除规则（负权重）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosExclusionRule {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_pos_exclusion_weight")]
    pub weight: i32,
    #[serde(default)]
    pub exclude_words: Vec<String>,
}

fn default_pos_exclusion_weight() -> i32 {
    -30
}

impl Default for PosExclusionRule {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            weight: default_pos_exclusion_weight(),
            exclude_words: Vec::new(),
        }
    }
}

impl PosExclusionRule {
    pub fn effective_weight(&self) -> i32 {
        effective_weight(self.enabled, self.weight)
    }
}

/// 长度与结构规则
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthStructureRule {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_length_structure_weight")]
    pub weight: i32,
    /// 偏好的人名长度（字符数）
    #[serde(default = "default_preferred_lengths")]
    pub preferred_lengths: Vec<usize>,
    /// 以这些字结尾的词不加分
    #[serde(default)]
    pub exclude_endings: Vec<String>,
}

fn default_length_structure_weight() -> i32 {
    10
}

fn default_preferred_lengths() -> Vec<usize> {
    vec![1, 2, 3]
}

impl Default for LengthStructureRule {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            weight: default_length_structure_weight(),
            preferred_lengths: default_preferred_lengths(),
            exclude_endings: Vec::new(),
        }
    }
}

impl LengthStructureRule {
    pub fn effective_weight(&self) -> i32 {
        effective_weight(self.enabled, self.weight)
    }
}

/// 全部打分规则
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default)]
    pub honorific: HonorificRule,
    #[serde(default)]
    pub call_position: CallPositionRule,
    #[serde(default)]
    pub repetition: RepetitionRule,
    #[serde(default)]
    pub pos_exclusion: PosExclusionRule,
    #[serde(default)]
    pub length_structure: LengthStructureRule,
}

// ============================================================================
// 强排除（闸门 1）与特殊名单
// ============================================================================

/// 强排除词表：命中直接判定"不是人名"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrongExclusionConfig {
    /// 语气词（精确匹配；多字语气词按子串匹配）
    #[serde(default)]
    pub interjections: Vec<String>,
    /// 动作动词前缀（长度 ≥2 的词以此开头即排除）
    #[serde(default)]
    pub action_verbs: Vec<String>,
    /// 代词（子串匹配）
    #[serde(default)]
    pub pronouns: Vec<String>,
    /// 数字/量词（子串匹配）
    #[serde(default)]
    pub numbers_quantifiers: Vec<String>,
    /// 亲属称呼/角色（精确匹配）
    #[serde(default)]
    pub kinship_roles: Vec<String>,
}

/// 白名单 / 黑名单
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialConfig {
    /// 白名单：直接判定为人名，优先级最高
    #[serde(default)]
    pub known_names: Vec<String>,
    /// 黑名单：直接排除（白名单优先）
    #[serde(default)]
    pub exclude_names: Vec<String>,
}

/// 词边界字符
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryConfig {
    #[serde(default = "default_boundary_chars")]
    pub chars: String,
}

fn default_boundary_chars() -> String {
    DEFAULT_BOUNDARY_CHARS.to_string()
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            chars: default_boundary_chars(),
        }
    }
}

// ============================================================================
// 顶层配置
// ============================================================================

/// Name Guard 配置（磁盘格式）
///
/// 由 [`crate::name_guard::RuleSet::from_config`] 编译为只读规则集
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameGuardConfig {
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub strong_exclusion: StrongExclusionConfig,
    #[serde(default)]
    pub special: SpecialConfig,
    #[serde(default)]
    pub boundary: BoundaryConfig,
}

/// 配置来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// 从配置文件加载
    File(PathBuf),
    /// 配置文件不存在，使用内置默认规则
    Builtin,
}

impl NameGuardConfig {
    /// 内置默认规则（带完整词表）
    ///
    /// 内置文件损坏时回退到空词表的结构默认值
    pub fn builtin() -> Self {
        match serde_json::from_str(BUILTIN_RULES_JSON) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("内置规则解析失败，回退结构默认值: {}", e);
                Self::default()
            }
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法获取配置目录"))?;
        let app_dir = config_dir.join(CONFIG_DIR_NAME);
        std::fs::create_dir_all(&app_dir)?;
        Ok(app_dir.join(CONFIG_FILENAME))
    }

    /// 从默认路径加载，文件不存在时返回内置规则
    pub fn load() -> Result<(Self, ConfigSource)> {
        let path = Self::config_path()?;
        tracing::info!("尝试从以下路径加载配置: {:?}", path);

        if path.exists() {
            let config = Self::load_from_path(&path)?;
            Ok((config, ConfigSource::File(path)))
        } else {
            tracing::warn!("配置文件不存在，使用内置默认规则");
            Ok((Self::builtin(), ConfigSource::Builtin))
        }
    }

    /// 从指定路径加载并校验
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("读取配置文件失败 {:?}: {}", path, e))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("解析配置文件失败 {:?}: {}", path, e))?;
        config.validate()?;
        tracing::info!("配置加载成功: {:?}", path);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to_path(&path)
    }

    /// 原子写入：先写临时文件，备份旧文件，再重命名
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let content = serde_json::to_string_pretty(self)?;
        tracing::info!("保存配置到: {:?}", path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("json.tmp");
        let backup_path = path.with_extension("json.bak");

        std::fs::write(&temp_path, &content).map_err(|e| {
            tracing::error!("写入临时文件失败: {}", e);
            e
        })?;

        if path.exists() {
            if backup_path.exists() {
                let _ = std::fs::remove_file(&backup_path);
            }
            std::fs::rename(path, &backup_path).map_err(|e| {
                tracing::error!("备份旧配置文件失败: {}", e);
                e
            })?;
        }

        match std::fs::rename(&temp_path, path) {
            Ok(_) => {
                let _ = std::fs::remove_file(&backup_path);
                tracing::info!("配置保存成功");
                Ok(())
            }
            Err(e) => {
                tracing::error!("重命名临时文件失败: {}", e);
                if backup_path.exists() {
                    if let Err(restore_err) = std::fs::rename(&backup_path, path) {
                        tracing::error!("恢复备份失败: {}", restore_err);
                    } else {
                        tracing::info!("已从备份恢复配置");
                    }
                }
                Err(e.into())
            }
        }
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        PlaceholderFormat::parse(&self.strategy.name_placeholder_format)?;

        let length = &self.rules.length_structure;
        if length.preferred_lengths.is_empty() {
            anyhow::bail!("preferred_lengths 不能为空");
        }
        if let Some(bad) = length
            .preferred_lengths
            .iter()
            .find(|len| !(1..=3).contains(*len))
        {
            anyhow::bail!("preferred_lengths 只支持 1-3 字，发现: {}", bad);
        }

        if self.rules.pos_exclusion.weight > 0 {
            anyhow::bail!(
                "pos_exclusion 权重必须为负数或 0，当前: {}",
                self.rules.pos_exclusion.weight
            );
        }

        if self.rules.repetition.min_occurrences == 0 {
            anyhow::bail!("repetition.min_occurrences 必须 ≥1");
        }

        let honorific = &self.rules.honorific;
        for pattern in honorific
            .suffix_patterns
            .iter()
            .chain(honorific.prefix_patterns.iter())
        {
            if normalize_word(pattern).is_empty() {
                anyhow::bail!("称呼前后缀不能为空字符串");
            }
        }

        let overlap: HashSet<&String> = self
            .special
            .known_names
            .iter()
            .filter(|name| self.special.exclude_names.contains(*name))
            .collect();
        if !overlap.is_empty() {
            // 白名单优先，仅提示
            tracing::warn!("以下名字同时出现在白名单和黑名单中，按白名单处理: {:?}", overlap);
        }

        Ok(())
    }
}
