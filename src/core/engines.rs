use crate::domain::model::{Engine, MatchMode, Outcome};
use crate::domain::ports::Matcher;
use crate::utils::error::{Result, SweepError};
use regex_automata::nfa::thompson::backtrack::{self, BoundedBacktracker};
use regex_automata::nfa::thompson::pikevm::{self, PikeVM};
use regex_automata::{Anchored, Input};

#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Step limit for fancy-regex's backtracking VM.
    pub backtrack_limit: usize,
}

impl Engine {
    pub fn compile(&self, pattern: &str, mode: MatchMode, options: EngineOptions) -> Result<Box<dyn Matcher>> {
        let pattern_error = |message: String| SweepError::PatternError {
            engine: self.name().to_string(),
            pattern: pattern.to_string(),
            message,
        };

        let matcher: Box<dyn Matcher> = match self {
            Engine::Regex => {
                let re = regex::Regex::new(&anchor(pattern, mode)).map_err(|e| pattern_error(e.to_string()))?;
                Box::new(RegexMatcher { re, mode })
            }
            Engine::Pikevm => {
                let vm = PikeVM::new(pattern).map_err(|e| pattern_error(e.to_string()))?;
                let cache = vm.create_cache();
                Box::new(PikeVmMatcher { vm, cache, mode })
            }
            Engine::Backtrack => {
                let bt = BoundedBacktracker::new(pattern).map_err(|e| pattern_error(e.to_string()))?;
                let cache = bt.create_cache();
                Box::new(BacktrackMatcher { bt, cache, mode })
            }
            Engine::Fancy => {
                let mut builder = fancy_regex::RegexBuilder::new(&force_backtracking(pattern, mode));
                builder.backtrack_limit(options.backtrack_limit);
                let re = builder.build().map_err(|e| pattern_error(e.to_string()))?;
                Box::new(FancyMatcher { re, mode })
            }
        };

        Ok(matcher)
    }
}

// regex / fancy-regex 沒有錨定搜尋的 API，用 ^ 包起來
fn anchor(pattern: &str, mode: MatchMode) -> String {
    match mode {
        MatchMode::Anchored => format!("^(?:{})", pattern),
        MatchMode::Tokenize => pattern.to_string(),
    }
}

// fancy-regex 會把沒有 lookaround / backref 的樣式整個交給 regex crate（線性時間），
// 結尾加一個恆真的 lookahead，樣式本體就只能在它的回溯 VM 上執行，backtrack_limit 才有作用
fn force_backtracking(pattern: &str, mode: MatchMode) -> String {
    format!("{}(?=[\\s\\S]|$)", anchor(&format!("(?:{})", pattern), mode))
}

fn span(start: usize, end: usize) -> Outcome {
    Outcome::Matched { start, end }
}

struct RegexMatcher {
    re: regex::Regex,
    mode: MatchMode,
}

impl Matcher for RegexMatcher {
    fn run(&mut self, haystack: &str) -> Outcome {
        match self.mode {
            MatchMode::Anchored => match self.re.find(haystack) {
                Some(m) => span(m.start(), m.end()),
                None => Outcome::NoMatch,
            },
            MatchMode::Tokenize => Outcome::Tokens {
                count: self.re.find_iter(haystack).count(),
            },
        }
    }
}

struct PikeVmMatcher {
    vm: PikeVM,
    cache: pikevm::Cache,
    mode: MatchMode,
}

impl Matcher for PikeVmMatcher {
    fn run(&mut self, haystack: &str) -> Outcome {
        match self.mode {
            MatchMode::Anchored => {
                let input = Input::new(haystack).anchored(Anchored::Yes);
                match self.vm.find(&mut self.cache, input) {
                    Some(m) => span(m.start(), m.end()),
                    None => Outcome::NoMatch,
                }
            }
            MatchMode::Tokenize => Outcome::Tokens {
                count: self.vm.find_iter(&mut self.cache, haystack).count(),
            },
        }
    }
}

struct BacktrackMatcher {
    bt: BoundedBacktracker,
    cache: backtrack::Cache,
    mode: MatchMode,
}

impl Matcher for BacktrackMatcher {
    fn run(&mut self, haystack: &str) -> Outcome {
        match self.mode {
            MatchMode::Anchored => {
                let input = Input::new(haystack).anchored(Anchored::Yes);
                match self.bt.try_find(&mut self.cache, input) {
                    Ok(Some(m)) => span(m.start(), m.end()),
                    Ok(None) => Outcome::NoMatch,
                    Err(e) => Outcome::Failed { reason: e.to_string() },
                }
            }
            MatchMode::Tokenize => {
                let mut count = 0;
                for result in self.bt.try_find_iter(&mut self.cache, haystack) {
                    match result {
                        Ok(_) => count += 1,
                        Err(e) => return Outcome::Failed { reason: e.to_string() },
                    }
                }
                Outcome::Tokens { count }
            }
        }
    }
}

struct FancyMatcher {
    re: fancy_regex::Regex,
    mode: MatchMode,
}

impl Matcher for FancyMatcher {
    fn run(&mut self, haystack: &str) -> Outcome {
        match self.mode {
            MatchMode::Anchored => match self.re.find(haystack) {
                Ok(Some(m)) => span(m.start(), m.end()),
                Ok(None) => Outcome::NoMatch,
                Err(e) => Outcome::Failed { reason: e.to_string() },
            },
            MatchMode::Tokenize => {
                let mut count = 0;
                for result in self.re.find_iter(haystack) {
                    match result {
                        Ok(_) => count += 1,
                        Err(e) => return Outcome::Failed { reason: e.to_string() },
                    }
                }
                Outcome::Tokens { count }
            }
        }
    }
}
