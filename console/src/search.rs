//! Vacancy search.

use tutorlink_model::Vacancy;

/// Index of the first vacancy matching the query.
///
/// Matching is a case-insensitive substring test over the title, subject
/// and salary text. A blank query matches nothing.
pub fn find_match(vacancies: &[Vacancy], query: &str) -> Option<usize> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    vacancies.iter().position(|vacancy| {
        vacancy.title.to_lowercase().contains(&needle)
            || vacancy.subject.to_lowercase().contains(&needle)
            || vacancy.salary.to_lowercase().contains(&needle)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use tutorlink_model::VacancyStatus;

    fn vacancy(id: &str, title: &str, subject: &str, salary: &str) -> Vacancy {
        Vacancy {
            id: id.to_string(),
            title: title.to_string(),
            subject: subject.to_string(),
            description: String::new(),
            requirements: vec![],
            salary: salary.to_string(),
            status: VacancyStatus::Open,
            featured: false,
            applications: vec![],
        }
    }

    fn fixture() -> Vec<Vacancy> {
        vec![
            vacancy("v1", "Grade 10 Mathematics", "Mathematics", "Rs. 30,000 - 40,000"),
            vacancy("v2", "AL Physics Tutor", "Physics", "Rs. 50,000"),
            vacancy("v3", "OL Science", "Science", "Negotiable"),
        ]
    }

    #[rstest]
    #[case("PHYSICS", Some(1))]
    #[case("grade 10", Some(0))]
    #[case("science", Some(2))]
    #[case("50,000", Some(1))]
    #[case("negotiable", Some(2))]
    #[case("mathematics", Some(0))]
    #[case("chemistry", None)]
    #[case("", None)]
    #[case("   ", None)]
    fn test_find_match_cases(#[case] query: &str, #[case] expected: Option<usize>) {
        assert_eq!(find_match(&fixture(), query), expected);
    }

    #[test]
    fn test_query_is_trimmed_before_matching() {
        assert_eq!(find_match(&fixture(), "  physics  "), Some(1));
    }

    proptest! {
        // Whatever the matcher returns must be the first genuine hit.
        #[test]
        fn test_match_is_first_and_real(
            titles in proptest::collection::vec("[a-c]{0,4}", 0..6),
            query in "[a-c]{1,3}",
        ) {
            let vacancies: Vec<Vacancy> = titles
                .iter()
                .enumerate()
                .map(|(i, title)| vacancy(&format!("v{}", i), title, "", ""))
                .collect();
            let contains = |v: &Vacancy| v.title.contains(query.as_str());

            match find_match(&vacancies, &query) {
                Some(index) => {
                    prop_assert!(contains(&vacancies[index]));
                    prop_assert!(vacancies[..index].iter().all(|v| !contains(v)));
                }
                None => prop_assert!(vacancies.iter().all(|v| !contains(v))),
            }
        }
    }
}
