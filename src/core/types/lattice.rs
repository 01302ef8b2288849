//! 求值级别与确定性格
//!
//! 两个全序格：
//! - `EvaluationLevel`：`PushDown < Processing < Planning`，子树的有效级别取最大值
//! - `Determinism`：`Nondeterministic < CommandDeterministic < Deterministic`，传播时取最小值

use serde::{Deserialize, Serialize};
use std::fmt;

/// 表达式最早可求值的生命周期阶段
///
/// 声明顺序即格序，`Ord` 派生依赖于此顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EvaluationLevel {
    /// 可作为下推语句的一部分交给数据源求值
    PushDown,
    /// 需要在引擎运行时逐行或逐次执行求值
    Processing,
    /// 需要在计划阶段求值一次
    Planning,
}

impl EvaluationLevel {
    pub const ALL: [EvaluationLevel; 3] = [
        EvaluationLevel::PushDown,
        EvaluationLevel::Processing,
        EvaluationLevel::Planning,
    ];

    /// 取两个级别中限制更强的一个
    pub fn most_restrictive(self, other: EvaluationLevel) -> EvaluationLevel {
        self.max(other)
    }
}

impl fmt::Display for EvaluationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationLevel::PushDown => write!(f, "PUSH_DOWN"),
            EvaluationLevel::Processing => write!(f, "PROCESSING"),
            EvaluationLevel::Planning => write!(f, "PLANNING"),
        }
    }
}

/// 函数或表达式结果在重复求值时的稳定程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Determinism {
    Nondeterministic,
    CommandDeterministic,
    Deterministic,
}

impl Determinism {
    /// 组合两个确定性级别，结果不会比任一输入更确定
    pub fn combine(self, other: Determinism) -> Determinism {
        self.min(other)
    }
}

impl Default for Determinism {
    fn default() -> Self {
        Determinism::Deterministic
    }
}

impl fmt::Display for Determinism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Determinism::Nondeterministic => write!(f, "NONDETERMINISTIC"),
            Determinism::CommandDeterministic => write!(f, "COMMAND_DETERMINISTIC"),
            Determinism::Deterministic => write!(f, "DETERMINISTIC"),
        }
    }
}
