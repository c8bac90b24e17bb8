//! crates/portal_core/src/roster.rs
//!
//! Detail views that stitch several collections together.
//!
//! Each function issues its store calls one after another, so the cost is a
//! fixed number of round trips per call (three for a class, two for a
//! student or an instructor) plus whatever the store needs for the `IN`
//! lookup. Nothing runs in a transaction: a concurrent delete can leave an
//! enrollment pointing at a student that no longer exists, which shows up as
//! a shorter student list rather than an error.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{AcademicRecord, Class, Grades, Instructor, Student};
use crate::ports::{DatabaseService, PortError, PortResult};

#[derive(Debug, Clone, Serialize)]
pub struct ClassDetail {
    pub class: Class,
    pub students: Vec<Student>,
    pub instructor: Option<Instructor>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentDetail {
    pub student: Student,
    #[serde(rename = "academicRecords")]
    pub academic_records: Vec<AcademicRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstructorDetail {
    pub instructor: Instructor,
    pub classes: Vec<Class>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RosterEntry {
    pub student: Student,
    pub grades: Grades,
    pub status: String,
}

/// A class as its instructor sees it: every enrolled student with grades.
#[derive(Debug, Clone, Serialize)]
pub struct ClassRoster {
    pub class: Class,
    pub students: Vec<RosterEntry>,
}

/// Resolves an optional reference, turning a dangling id into `None`.
async fn resolve_instructor(
    db: &dyn DatabaseService,
    instructor_id: Option<Uuid>,
) -> PortResult<Option<Instructor>> {
    let Some(id) = instructor_id else {
        return Ok(None);
    };
    match db.get_instructor(id).await {
        Ok(instructor) => Ok(Some(instructor)),
        Err(PortError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// class -> enrollments -> students, then class -> instructor.
pub async fn class_detail(db: &dyn DatabaseService, class_id: Uuid) -> PortResult<ClassDetail> {
    let class = db.get_class(class_id).await?;
    let enrollments = db.list_enrollments_for_class(class_id).await?;
    let student_ids: Vec<Uuid> = enrollments.iter().map(|e| e.student_id).collect();
    let students = db.find_students_by_ids(&student_ids).await?;
    let instructor = resolve_instructor(db, class.instructor_id).await?;

    Ok(ClassDetail {
        class,
        students,
        instructor,
    })
}

pub async fn student_detail(
    db: &dyn DatabaseService,
    student_id: Uuid,
) -> PortResult<StudentDetail> {
    let student = db.get_student(student_id).await?;
    let academic_records = db.list_academic_records(student_id).await?;
    Ok(StudentDetail {
        student,
        academic_records,
    })
}

pub async fn instructor_detail(
    db: &dyn DatabaseService,
    instructor_id: Uuid,
) -> PortResult<InstructorDetail> {
    let instructor = db.get_instructor(instructor_id).await?;
    let classes = db.list_classes_by_instructor(instructor_id).await?;
    Ok(InstructorDetail {
        instructor,
        classes,
    })
}

/// Same hops as [`class_detail`] minus the instructor, keeping each
/// enrollment's grades. Enrollments whose student is gone are dropped.
pub async fn class_roster(db: &dyn DatabaseService, class: Class) -> PortResult<ClassRoster> {
    let enrollments = db.list_enrollments_for_class(class.id).await?;
    let student_ids: Vec<Uuid> = enrollments.iter().map(|e| e.student_id).collect();
    let mut students = db.find_students_by_ids(&student_ids).await?;

    let mut entries = Vec::with_capacity(enrollments.len());
    for enrollment in enrollments {
        let Some(pos) = students.iter().position(|s| s.id == enrollment.student_id) else {
            continue;
        };
        entries.push(RosterEntry {
            student: students.swap_remove(pos),
            grades: enrollment.grades,
            status: enrollment.status,
        });
    }

    Ok(ClassRoster {
        class,
        students: entries,
    })
}
