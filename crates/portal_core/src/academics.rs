//! crates/portal_core/src/academics.rs
//!
//! Credit and grade-point arithmetic over a student's academic records, and
//! grouping of a program's subjects by category.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{AcademicRecord, Completion, CourseResult, ProgramSubject};

/// Credits a student needs to graduate.
pub const TOTAL_CREDITS_REQUIRED: u32 = 150;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemesterSummary {
    pub semester: String,
    pub credits_taken: u32,
    pub semester_average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcademicSummary {
    pub total_credits_taken: u32,
    pub accumulated_average: f64,
    pub total_credits_required: u32,
    pub semesters: Vec<SemesterSummary>,
}

/// Running weighted mean of course scores.
#[derive(Default)]
struct WeightedScore {
    weighted_sum: f64,
    credits: u32,
}

impl WeightedScore {
    fn add(&mut self, score: f64, credits: u32) {
        self.weighted_sum += score * f64::from(credits);
        self.credits = self.credits.saturating_add(credits);
    }

    fn average(&self) -> f64 {
        if self.credits == 0 {
            return 0.0;
        }
        round2(self.weighted_sum / f64::from(self.credits))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Score that counts toward an average, if any.
fn graded_score(course: &CourseResult) -> Option<f64> {
    match course.complete {
        Completion::Passed => course.total_score,
        _ => None,
    }
}

pub fn summarize(records: &[AcademicRecord]) -> AcademicSummary {
    let mut total_credits_taken: u32 = 0;
    let mut overall = WeightedScore::default();
    let mut semesters = Vec::with_capacity(records.len());

    for record in records {
        let mut semester = WeightedScore::default();
        let mut semester_credits: u32 = 0;

        for course in &record.courses {
            semester_credits = semester_credits.saturating_add(course.credits);

            match course.complete {
                Completion::InProgress => continue,
                Completion::Failed => {}
                Completion::Passed | Completion::Exempt => {
                    total_credits_taken = total_credits_taken.saturating_add(course.credits)
                }
            }

            if let Some(score) = graded_score(course) {
                overall.add(score, course.credits);
                semester.add(score, course.credits);
            }
        }

        semesters.push(SemesterSummary {
            semester: record.semester.clone(),
            credits_taken: semester_credits,
            semester_average: semester.average(),
        });
    }

    AcademicSummary {
        total_credits_taken,
        accumulated_average: overall.average(),
        total_credits_required: TOTAL_CREDITS_REQUIRED,
        semesters,
    }
}

/// Groups subjects by category, keeping their order within each category.
pub fn group_by_category(subjects: Vec<ProgramSubject>) -> BTreeMap<String, Vec<ProgramSubject>> {
    let mut grouped: BTreeMap<String, Vec<ProgramSubject>> = BTreeMap::new();
    for subject in subjects {
        grouped.entry(subject.category.clone()).or_default().push(subject);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn course(code: &str, credits: u32, score: Option<f64>, exempt: bool) -> CourseResult {
        CourseResult {
            course_code: code.to_string(),
            course_name: format!("Course {code}"),
            credits,
            total_score: score,
            exempt,
            complete: Completion::from_score(score, exempt),
        }
    }

    fn record(semester: &str, courses: Vec<CourseResult>) -> AcademicRecord {
        AcademicRecord {
            id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            semester: semester.to_string(),
            status: "completed".to_string(),
            courses,
        }
    }

    #[test]
    fn empty_history_has_zero_average() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_credits_taken, 0);
        assert_eq!(summary.accumulated_average, 0.0);
        assert_eq!(summary.total_credits_required, 150);
        assert!(summary.semesters.is_empty());
    }

    #[test]
    fn weighted_average_skips_failed_exempt_and_in_progress() {
        let records = vec![
            record(
                "Semester 1",
                vec![
                    course("IT001", 4, Some(8.0), false),
                    course("IT002", 2, Some(5.0), false),
                    course("PE001", 2, None, true),
                    course("MA001", 3, Some(2.0), false),
                ],
            ),
            record("Semester 2", vec![course("IT003", 4, None, false)]),
        ];

        let summary = summarize(&records);

        // Passed (4 + 2) and exempt (2) count; failed and in-progress do not.
        assert_eq!(summary.total_credits_taken, 8);
        // (8.0 * 4 + 5.0 * 2) / 6 = 7.0
        assert_eq!(summary.accumulated_average, 7.0);

        assert_eq!(summary.semesters[0].credits_taken, 11);
        assert_eq!(summary.semesters[0].semester_average, 7.0);
        assert_eq!(summary.semesters[1].credits_taken, 4);
        assert_eq!(summary.semesters[1].semester_average, 0.0);
    }

    #[test]
    fn averages_round_to_two_decimals() {
        let records = vec![record(
            "Semester 1",
            vec![
                course("A", 3, Some(7.0), false),
                course("B", 3, Some(8.0), false),
                course("C", 3, Some(8.0), false),
            ],
        )];
        assert_eq!(summarize(&records).accumulated_average, 7.67);
    }

    #[test]
    fn oversized_credit_counts_saturate() {
        let records = vec![record(
            "2024-1",
            vec![
                course("A", u32::MAX, Some(8.0), false),
                course("B", 5, Some(6.0), false),
            ],
        )];
        let summary = summarize(&records);

        assert_eq!(summary.total_credits_taken, u32::MAX);
        assert_eq!(summary.semesters[0].credits_taken, u32::MAX);
        assert!(summary.accumulated_average.is_finite());
    }

    #[test]
    fn subjects_group_by_category() {
        let subject = |code: &str, category: &str| ProgramSubject {
            course_code: code.to_string(),
            course_name: code.to_string(),
            credits: 3,
            category: category.to_string(),
        };
        let grouped = group_by_category(vec![
            subject("IT001", "core"),
            subject("PE001", "general"),
            subject("IT002", "core"),
        ]);

        assert_eq!(grouped.len(), 2);
        let core: Vec<_> = grouped["core"].iter().map(|s| s.course_code.as_str()).collect();
        assert_eq!(core, ["IT001", "IT002"]);
    }
}
