//! Pathological pattern families and their input generators.
//!
//! Every built-in family matches against a run of `a` characters except the
//! WHILE tokenizer, which scans copies of a small factorial program.

use crate::domain::model::{MatchMode, Workload, WorkloadKind};
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_required_field};

/// Placeholder replaced by the current input size in pattern templates.
pub const SIZE_PLACEHOLDER: &str = "{n}";

/// Token alternation for the WHILE toy language, keywords first.
const WHILE_TOKENS: &str = concat!(
    r"skip|while|do|if|then|else|read|write",
    r"|[A-Za-z_.><;=,:\\][A-Za-z_.><;=,:\\0-9]*",
    r"|\+|-|\*|/|%|:=|!=|=|<|>",
    r"|0|[1-9][0-9]*",
    r"|;",
    r#"|"(?:[A-Za-z_.><;=,:\\]*|[ \n\t]+|[0-9])""#,
    r"|[(){}]",
    r"|[ \n\t]+",
);

const FACTORIAL_PROGRAM: &str = r#"read (n);
factorial := 1;
i := 1;
while i <= n do {
 factorial := factorial * i;
 i := i + 1
};
result := factorial;
write (result)"#;

impl Workload {
    pub fn from_kind(kind: WorkloadKind, pattern: Option<&String>, unit: Option<&String>) -> Result<Self> {
        Ok(match kind {
            WorkloadKind::StarStar => Workload::StarStar,
            WorkloadKind::OptionalRepeat => Workload::OptionalRepeat,
            WorkloadKind::Alternation => Workload::Alternation,
            WorkloadKind::PlusPlus => Workload::PlusPlus,
            WorkloadKind::WhileProgram => Workload::WhileProgram,
            WorkloadKind::Custom => {
                let pattern = validate_required_field("pattern", &pattern.cloned())?.clone();
                validate_non_empty_string("pattern", &pattern)?;
                let unit = validate_required_field("unit", &unit.cloned())?.clone();
                validate_non_empty_string("unit", &unit)?;
                Workload::Custom { pattern, unit }
            }
        })
    }

    pub fn kind(&self) -> WorkloadKind {
        match self {
            Workload::StarStar => WorkloadKind::StarStar,
            Workload::OptionalRepeat => WorkloadKind::OptionalRepeat,
            Workload::Alternation => WorkloadKind::Alternation,
            Workload::PlusPlus => WorkloadKind::PlusPlus,
            Workload::WhileProgram => WorkloadKind::WhileProgram,
            Workload::Custom { .. } => WorkloadKind::Custom,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Workload::StarStar => "star-star",
            Workload::OptionalRepeat => "optional-repeat",
            Workload::Alternation => "alternation",
            Workload::PlusPlus => "plus-plus",
            Workload::WhileProgram => "while-program",
            Workload::Custom { .. } => "custom",
        }
    }

    /// The pattern with `{n}` left unexpanded.
    pub fn pattern_template(&self) -> String {
        match self {
            Workload::StarStar => "(a*)*b".to_string(),
            Workload::OptionalRepeat => "((a?){{n}})((a){{n}})".to_string(),
            Workload::Alternation => "(a|aa)*".to_string(),
            Workload::PlusPlus => "(a+a+)+b".to_string(),
            Workload::WhileProgram => WHILE_TOKENS.to_string(),
            Workload::Custom { pattern, .. } => pattern.clone(),
        }
    }

    pub fn pattern(&self, n: usize) -> String {
        self.pattern_template()
            .replace(SIZE_PLACEHOLDER, &n.to_string())
    }

    pub fn haystack(&self, n: usize) -> String {
        match self {
            Workload::WhileProgram => {
                let copies = n.max(1);
                let mut program = String::with_capacity((FACTORIAL_PROGRAM.len() + 1) * copies);
                for i in 0..copies {
                    if i > 0 {
                        program.push('\n');
                    }
                    program.push_str(FACTORIAL_PROGRAM);
                }
                program
            }
            Workload::Custom { unit, .. } => unit.repeat(n),
            _ => "a".repeat(n),
        }
    }

    pub fn default_mode(&self) -> MatchMode {
        match self {
            Workload::WhileProgram => MatchMode::Tokenize,
            _ => MatchMode::Anchored,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Workload::WhileProgram => format!(
                "WHILE tokenizer over the factorial program repeated n times ({} bytes per copy)",
                FACTORIAL_PROGRAM.len()
            ),
            Workload::Custom { unit, .. } => {
                format!("{} against '{}' repeated n times", self.pattern_template(), unit)
            }
            _ => format!("{} against 'a' repeated n times", self.pattern_template()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::SweepError;

    #[test]
    fn test_optional_repeat_expands_counted_repetition() {
        assert_eq!(Workload::OptionalRepeat.pattern(3), "((a?){3})((a){3})");
        assert_eq!(Workload::OptionalRepeat.haystack(3), "aaa");
    }

    #[test]
    fn test_fixed_patterns_ignore_size() {
        assert_eq!(Workload::StarStar.pattern(40), "(a*)*b");
        assert_eq!(Workload::StarStar.haystack(0), "");
        assert_eq!(Workload::PlusPlus.haystack(4), "aaaa");
    }

    #[test]
    fn test_while_program_repeats_at_least_once() {
        let one = Workload::WhileProgram.haystack(0);
        assert_eq!(one, FACTORIAL_PROGRAM);
        let three = Workload::WhileProgram.haystack(3);
        assert_eq!(three.matches("factorial := 1;").count(), 3);
        assert_eq!(Workload::WhileProgram.default_mode(), MatchMode::Tokenize);
    }

    #[test]
    fn test_while_tokens_compile() {
        assert!(regex::Regex::new(WHILE_TOKENS).is_ok());
    }

    #[test]
    fn test_custom_requires_pattern() {
        let err = Workload::from_kind(WorkloadKind::Custom, None, None);
        assert!(err.is_err());

        let pattern = "(x+x+)+y".to_string();
        let unit = "x".to_string();
        let workload = Workload::from_kind(WorkloadKind::Custom, Some(&pattern), Some(&unit)).unwrap();
        assert_eq!(workload.haystack(2), "xx");
        assert_eq!(workload.kind(), WorkloadKind::Custom);
    }

    #[test]
    fn test_custom_requires_a_unit() {
        let pattern = "a{{n}}".to_string();
        assert!(matches!(
            Workload::from_kind(WorkloadKind::Custom, Some(&pattern), None),
            Err(SweepError::MissingConfigError { ref field }) if field == "unit"
        ));

        let blank = " ".to_string();
        assert!(Workload::from_kind(WorkloadKind::Custom, Some(&pattern), Some(&blank)).is_err());

        let unit = "a".to_string();
        let workload = Workload::from_kind(WorkloadKind::Custom, Some(&pattern), Some(&unit)).unwrap();
        assert_eq!(workload.pattern(5), "a{5}");
        assert_eq!(workload.haystack(2), "aa");
    }
}
