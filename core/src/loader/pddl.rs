//! PDDL problem loader
//!
//! Reads the `(ontable x)` and `(on x y)` propositions of a blocks world
//! problem file. Everything before `(:goal` describes the initial state,
//! everything after it the goal. Other propositions (`clear`, `handempty`)
//! are implied by the stacks and ignored.

use super::{BlocksProblem, LoadError, LoadResult};
use regex::Regex;
use rustc_hash::FxHashMap;
use std::fs;
use std::path::Path;

/// Compiled proposition patterns
struct Patterns {
    goal: Regex,
    ontable: Regex,
    on: Regex,
    problem: Regex,
}

impl Patterns {
    fn new() -> LoadResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| LoadError::ParseError(e.to_string()))
        };
        Ok(Self {
            goal: compile(r"(?i)\(:goal")?,
            ontable: compile(r"(?i)\(ontable\s+([^\s\)]+)\s*\)")?,
            on: compile(r"(?i)\(on\s+([^\s\)]+)\s+([^\s\)]+)\s*\)")?,
            problem: compile(r"(?i)\(problem\s+([^\s\)]+)\s*\)")?,
        })
    }
}

/// Propositions collected for one state
#[derive(Debug, Default)]
struct StateFacts {
    /// Blocks on the table, in the order they were mentioned
    table: Vec<String>,
    /// below -> block directly on it
    above: FxHashMap<String, String>,
    /// block -> block directly under it
    below: FxHashMap<String, String>,
    mentioned: Vec<String>,
}

impl StateFacts {
    fn collect(patterns: &Patterns, text: &str) -> LoadResult<Self> {
        let mut facts = Self::default();

        for caps in patterns.ontable.captures_iter(text) {
            let block = caps[1].to_string();
            facts.mention(&block);
            if !facts.table.contains(&block) {
                facts.table.push(block);
            }
        }

        for caps in patterns.on.captures_iter(text) {
            let (top, bottom) = (caps[1].to_string(), caps[2].to_string());
            facts.mention(&top);
            facts.mention(&bottom);
            if let Some(other) = facts.above.insert(bottom.clone(), top.clone()) {
                if other != top {
                    return Err(LoadError::InvalidFormat(format!(
                        "both {} and {} are on {}",
                        other, top, bottom
                    )));
                }
            }
            if let Some(other) = facts.below.insert(top.clone(), bottom.clone()) {
                if other != bottom {
                    return Err(LoadError::InvalidFormat(format!(
                        "{} is on both {} and {}",
                        top, other, bottom
                    )));
                }
            }
        }

        // A block with something on it but resting on nothing is on the table
        let implied: Vec<String> = facts
            .mentioned
            .iter()
            .filter(|b| facts.above.contains_key(*b) && !facts.below.contains_key(*b))
            .filter(|b| !facts.table.contains(*b))
            .cloned()
            .collect();
        facts.table.extend(implied);

        Ok(facts)
    }

    fn mention(&mut self, block: &str) {
        if !self.mentioned.iter().any(|b| b == block) {
            self.mentioned.push(block.to_string());
        }
    }

    /// Towers listed bottom to top, one per table block
    fn stacks(&self) -> LoadResult<Vec<Vec<String>>> {
        let mut stacks = Vec::with_capacity(self.table.len());
        let mut placed = 0;

        for bottom in &self.table {
            if self.below.contains_key(bottom) {
                return Err(LoadError::InvalidFormat(format!(
                    "{} is both on the table and on {}",
                    bottom, self.below[bottom]
                )));
            }
            let mut stack = vec![bottom.clone()];
            let mut block = bottom;
            while let Some(next) = self.above.get(block) {
                stack.push(next.clone());
                block = next;
            }
            placed += stack.len();
            stacks.push(stack);
        }

        if placed != self.mentioned.len() {
            return Err(LoadError::InvalidFormat(
                "some blocks do not rest on the table (cyclic on propositions)".to_string(),
            ));
        }
        Ok(stacks)
    }
}

/// Parse a PDDL problem
///
/// `fallback_id` names the problem when the text has no `(problem ...)` header.
pub fn parse_problem(text: &str, fallback_id: &str) -> LoadResult<BlocksProblem> {
    let patterns = Patterns::new()?;
    let Some(marker) = patterns.goal.find(text) else {
        return Err(LoadError::ParseError("missing (:goal section".to_string()));
    };
    let (init_text, goal_text) = text.split_at(marker.start());

    let id = patterns
        .problem
        .captures(init_text)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| fallback_id.to_string());

    let initial = StateFacts::collect(&patterns, init_text)?.stacks()?;
    if initial.is_empty() {
        return Err(LoadError::ParseError(
            "initial state has no ontable propositions".to_string(),
        ));
    }
    let goal = StateFacts::collect(&patterns, goal_text)?.stacks()?;

    Ok(BlocksProblem { id, initial, goal })
}

/// Load a problem from a PDDL file
pub fn load_problem<P: AsRef<Path>>(path: P) -> LoadResult<BlocksProblem> {
    let path = path.as_ref();

    let text = fs::read_to_string(path)
        .map_err(|e| LoadError::FileNotFound(format!("{}: {}", path.display(), e)))?;

    let fallback = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("problem");
    parse_problem(&text, fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUSSMAN: &str = "
(define (problem sussman)
  (:domain blocksworld)
  (:objects a b c)
  (:init (handempty)
         (ontable a) (ontable b)
         (on c a)
         (clear b) (clear c))
  (:goal (and (on a b)
              (on b c))))
";

    fn labels(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|s| s.iter().map(|b| b.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_parse_sussman_anomaly() {
        let problem = parse_problem(SUSSMAN, "fallback").unwrap();

        assert_eq!(problem.id, "sussman");
        assert_eq!(problem.initial, labels(&[&["a", "c"], &["b"]]));
        // c has b on it and rests on nothing, so it goes on the table
        assert_eq!(problem.goal, labels(&[&["c", "b", "a"]]));
    }

    #[test]
    fn test_one_proposition_per_line() {
        let text = "(:init\n(ontable b1)\n(on b2 b1)\n(on b3 b2)\n)\n(:goal (and\n(ontable b3)\n(on b1 b3)\n))";
        let problem = parse_problem(text, "lines").unwrap();

        assert_eq!(problem.id, "lines");
        assert_eq!(problem.initial, labels(&[&["b1", "b2", "b3"]]));
        assert_eq!(problem.goal, labels(&[&["b3", "b1"]]));
    }

    #[test]
    fn test_goal_blocks_left_out() {
        let text = "(:init (ontable a) (ontable b) (ontable c)) (:goal (and (on a b)))";
        let instance = parse_problem(text, "partial").unwrap().to_instance().unwrap();

        // c is not in the goal and defaults to the table
        assert_eq!(instance.goal.num_stacks(), 2);
        assert_eq!(instance.goal.num_blocks(), 3);
    }

    #[test]
    fn test_missing_goal_section() {
        let err = parse_problem("(:init (ontable a))", "x").unwrap_err();
        assert!(matches!(err, LoadError::ParseError(_)));
    }

    #[test]
    fn test_cyclic_on_rejected() {
        let text = "(:init (ontable a) (on b c) (on c b)) (:goal (and))";
        let err = parse_problem(text, "cycle").unwrap_err();
        assert!(matches!(err, LoadError::InvalidFormat(_)));
    }

    #[test]
    fn test_two_blocks_on_one_rejected() {
        let text = "(:init (ontable a) (on b a) (on c a)) (:goal (and))";
        let err = parse_problem(text, "fork").unwrap_err();
        assert!(matches!(err, LoadError::InvalidFormat(_)));
    }
}
