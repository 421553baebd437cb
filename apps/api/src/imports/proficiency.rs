//! Rule-based proficiency inference used during bulk employee import.
//!
//! `infer` maps a (project role, skill requirement) label pair to a score
//! for every technology in a fixed catalogue. It is a pure function: no
//! I/O, no state, identical inputs always yield identical output.

use serde::Serialize;

/// The closed technology catalogue. Output order follows this array.
/// Adding a technology means extending this list and the rules together.
pub const TECHNOLOGIES: [&str; 7] = [
    "Angular",
    "React",
    ".Net",
    "SQL",
    "Postgresql",
    "AWS",
    "Python",
];

const ANGULAR: usize = 0;
const REACT: usize = 1;
const DOT_NET: usize = 2;
const SQL: usize = 3;
const AWS: usize = 5;

const SENIORITY_TOKENS: [&str; 3] = ["Lead", "Senior", "Sr."];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechProficiency {
    pub technology: &'static str,
    #[serde(rename = "proficiencyLevel")]
    pub level: i32,
}

/// Scores every catalogue technology in [0, 3] for the given role and
/// skill labels. Empty labels are valid input and simply match no rule.
///
/// Rules run in order; apart from the full-stack baseline being overwritten
/// by a literal technology match, later rules only ever raise scores.
pub fn infer(role: &str, skill: &str) -> Vec<TechProficiency> {
    let mut scores = [0i32; TECHNOLOGIES.len()];

    // Full-stack signal seeds a baseline profile.
    if role.contains("Fullstack Developer") || skill.contains("FSE") {
        scores[ANGULAR] = 2;
        scores[DOT_NET] = 3;
        scores[SQL] = 3;
    }

    // A literal technology mention in either label is authoritative.
    // Case-sensitive on purpose: the catalogue spelling is the contract.
    for (i, tech) in TECHNOLOGIES.iter().enumerate() {
        if role.contains(tech) || skill.contains(tech) {
            scores[i] = 3;
        }
    }

    // Specialization signals raise scores, never lower them.
    if role.contains("Backend Developer") || skill.contains("Angular") {
        scores[ANGULAR] = scores[ANGULAR].max(2);
        scores[SQL] = scores[SQL].max(1);
    }
    if role.contains("Frontend Developer") || skill.contains("React") {
        scores[REACT] = 3;
        scores[SQL] = scores[SQL].max(1);
    }
    if role.contains("Cloud Architect") || skill.contains("AWS") {
        scores[AWS] = scores[AWS].max(2);
    }

    // Seniority boost: one pass, everything below expert gets a bump.
    if SENIORITY_TOKENS.iter().any(|t| role.contains(t)) {
        for score in scores.iter_mut() {
            if *score < 3 {
                *score += 1;
            }
        }
    }

    // The rules above cannot exceed 3, but the cap is an explicit invariant.
    for score in scores.iter_mut() {
        *score = (*score).min(3);
    }

    TECHNOLOGIES
        .iter()
        .zip(scores)
        .map(|(technology, level)| TechProficiency { technology, level })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score_of(result: &[TechProficiency], tech: &str) -> i32 {
        result
            .iter()
            .find(|p| p.technology == tech)
            .map(|p| p.level)
            .unwrap_or_else(|| panic!("{tech} missing from catalogue output"))
    }

    #[test]
    fn test_empty_inputs_all_zero() {
        let result = infer("", "");
        assert_eq!(result.len(), 7);
        assert!(result.iter().all(|p| p.level == 0));
    }

    #[test]
    fn test_catalogue_order_preserved() {
        let result = infer("Fullstack Developer", "FSE");
        let names: Vec<&str> = result.iter().map(|p| p.technology).collect();
        assert_eq!(names, TECHNOLOGIES);
    }

    #[test]
    fn test_fullstack_baseline() {
        let result = infer("Fullstack Developer", "");
        assert_eq!(score_of(&result, "Angular"), 2);
        assert_eq!(score_of(&result, ".Net"), 3);
        assert_eq!(score_of(&result, "SQL"), 3);
        assert_eq!(score_of(&result, "React"), 0);
    }

    #[test]
    fn test_fse_skill_triggers_fullstack_baseline() {
        let result = infer("", "FSE");
        assert_eq!(score_of(&result, ".Net"), 3);
        assert_eq!(score_of(&result, "SQL"), 3);
    }

    #[test]
    fn test_literal_mention_is_expert() {
        let result = infer("Python Developer", "");
        assert_eq!(score_of(&result, "Python"), 3);

        let result = infer("", "Postgresql");
        assert_eq!(score_of(&result, "Postgresql"), 3);
    }

    #[test]
    fn test_literal_match_is_case_sensitive() {
        let result = infer("", "react");
        assert_eq!(score_of(&result, "React"), 0);
    }

    #[test]
    fn test_backend_signal_raises_without_lowering() {
        // Angular mentioned literally scores 3; the backend/Angular rule
        // must not pull it back down to 2.
        let result = infer("Backend Developer", "Angular");
        assert_eq!(score_of(&result, "Angular"), 3);
        assert_eq!(score_of(&result, "SQL"), 1);
    }

    #[test]
    fn test_cloud_signal_raises_aws() {
        let result = infer("Cloud Architect", "");
        assert_eq!(score_of(&result, "AWS"), 2);

        // Literal AWS mention already scored 3; cloud rule must not lower it.
        let result = infer("Cloud Architect", "AWS");
        assert_eq!(score_of(&result, "AWS"), 3);
    }

    #[test]
    fn test_senior_frontend_react_scenario() {
        let result = infer("Senior Frontend Developer", "React");
        assert_eq!(score_of(&result, "React"), 3);
        assert_eq!(score_of(&result, "SQL"), 2);
        for tech in ["Angular", ".Net", "Postgresql", "AWS", "Python"] {
            assert_eq!(score_of(&result, tech), 1, "{tech}");
        }
    }

    #[test]
    fn test_seniority_boost_single_pass() {
        // "Senior" and "Lead" together must not double the boost.
        let result = infer("Senior Lead Frontend Developer", "React");
        assert_eq!(score_of(&result, "Angular"), 1);
    }

    #[test]
    fn test_seniority_never_decreases_any_score() {
        let cases = [
            ("Frontend Developer", "React"),
            ("Fullstack Developer", "SQL"),
            ("Cloud Architect", "AWS"),
            ("Backend Developer", ""),
            ("", ""),
        ];
        for (role, skill) in cases {
            let plain = infer(role, skill);
            let senior = infer(&format!("Senior {role}"), skill);
            for (p, s) in plain.iter().zip(&senior) {
                assert!(
                    s.level >= p.level,
                    "seniority lowered {} for ({role}, {skill})",
                    p.technology
                );
            }
        }
    }

    #[test]
    fn test_scores_always_within_bounds() {
        let cases = [
            ("Senior Fullstack Developer", "FSE"),
            ("Lead Cloud Architect", "AWS"),
            ("Sr. Frontend Developer", "React, Angular"),
            ("Senior Backend Developer", "SQL"),
        ];
        for (role, skill) in cases {
            for p in infer(role, skill) {
                assert!(
                    (0..=3).contains(&p.level),
                    "{} = {} for ({role}, {skill})",
                    p.technology,
                    p.level
                );
            }
        }
    }

    #[test]
    fn test_pure_function_idempotence() {
        let first = infer("Senior Fullstack Developer", "React");
        let second = infer("Senior Fullstack Developer", "React");
        assert_eq!(first, second);
    }
}
