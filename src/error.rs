//! 错误类型模块：致命错误走 `Result`，解析诊断累积在列表里

use thiserror::Error; // 引入 thiserror 帮助我们简洁地定义错误枚举

/// 渲染流程中用来传播的致命错误
#[derive(Debug, Error, Clone)]
pub enum RenderError {
    /// 用户传入了空字符串
    #[error("输入的公式为空")]
    EmptyInput,
    /// 字体数据库或字形文件无法加载
    #[error("字体加载失败: {0}")]
    FontLoadError(String),
    /// SVG 输出阶段失败
    #[error("SVG 渲染失败: {0}")]
    RenderFailure(String),
    /// 跨语言传入的字符串不是合法 UTF-8
    #[error("公式不是合法的 UTF-8 文本")]
    InvalidUtf8,
    /// 输入超过便捷接口的长度或嵌套限制
    #[error("公式超出限制: {0}")]
    LimitExceeded(String),
    /// 捕获 panic 后返回的通用错误
    #[error("内部渲染发生未知异常")]
    UnexpectedPanic,
}

/// 解析阶段的非致命诊断，解析器遇到后继续工作
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("位置 {0}: 反斜杠后缺少指令名")]
    UnterminatedInstruction(usize),
    #[error("位置 {pos}: 逐字文本缺少结束符 '{delimiter}'")]
    UnterminatedVerbatim { pos: usize, delimiter: String },
    #[error("位置 {pos}: 指令 \\{instruction} 缺少第 {index} 个 {{...}} 参数")]
    MissingArgument {
        pos: usize,
        instruction: String,
        index: usize,
    },
    #[error("位置 {pos}: 未知指令 \\{name}")]
    UnknownInstruction { pos: usize, name: String },
    #[error("位置 {pos}: 未知环境 '{name}'")]
    UnknownEnvironment { pos: usize, name: String },
    #[error("位置 {pos}: \\end{{{name}}} 没有对应的 \\begin{{{name}}}")]
    UnmatchedEnvironmentEnd { pos: usize, name: String },
    #[error("位置 {pos}: 指令 \\{instruction} 的参数列表格式错误")]
    MalformedParameters { pos: usize, instruction: String },
    #[error("未知符号 '{0}'")]
    UnknownSymbol(String),
    #[error("位置 {pos}: 环境 '{name}' 中某行的列数不一致")]
    ColumnCount { pos: usize, name: String },
    #[error("位置 {pos}: \\{instruction} 之后出现了意外的记号")]
    UnexpectedBraceToken { pos: usize, instruction: String },
    #[error("位置 {0}: 缺少匹配的右大括号")]
    MissingClosingBrace(usize),
    #[error("位置 {pos}: 环境 '{name}' 缺少 \\end{{{name}}}")]
    UnterminatedEnvironment { pos: usize, name: String },
    #[error("位置 {0}: \\left 缺少对应的 \\right")]
    UnmatchedLeft(usize),
}
