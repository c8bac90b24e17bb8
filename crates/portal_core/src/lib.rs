pub mod academics;
pub mod domain;
pub mod ports;
pub mod roster;

pub use domain::{
    AcademicRecord, Class, Completion, CourseResult, Enrollment, Grades, Instructor, Notification,
    NotificationPatch, Principal, PrincipalProfile, Program, ProgramSubject, Role, Scholarship,
    Student, TargetType,
};
pub use ports::{DatabaseService, PortError, PortResult};
