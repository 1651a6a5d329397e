//! Command-line grammar of `portal-admin`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::idempotency::SubmissionKey;
use crate::domain::{
    ContentId, EnrollmentId, GradeState, ModuleId, OfferingId, PaymentId, PersonId, Presence,
    TeacherId,
};

/// `portal-admin` arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "portal-admin",
    about = "Operate enrollments, payments, and grades against the portal backend",
    version
)]
pub struct Cli {
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level command groups.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Payment review and submission.
    #[command(subcommand)]
    Payments(PaymentCommand),
    /// Enrollment views.
    #[command(subcommand)]
    Enrollments(EnrollmentCommand),
    /// Certificate downloads.
    #[command(subcommand)]
    Certificates(CertificateCommand),
    /// Module grades.
    #[command(subcommand)]
    Grades(GradeCommand),
    /// Attendance records.
    #[command(subcommand)]
    Attendance(AttendanceCommand),
    /// Teacher records and module assignments.
    #[command(subcommand)]
    Teachers(TeacherCommand),
    /// Catalogue and offering listings.
    #[command(subcommand)]
    Courses(CourseCommand),
    /// Support material.
    #[command(subcommand)]
    Support(SupportCommand),
}

/// `payments` subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum PaymentCommand {
    /// List every payment.
    List,
    /// Approve a pending payment.
    Approve {
        /// Payment to approve.
        payment: PaymentId,
        /// Do not send the payment-approved email.
        #[arg(long)]
        skip_email: bool,
    },
    /// Reject a pending payment.
    Reject {
        /// Payment to reject.
        payment: PaymentId,
    },
    /// Enroll a student and register their payment with a receipt.
    Submit(SubmitArgs),
}

/// Arguments of `payments submit`.
#[derive(Debug, Clone, Args)]
pub struct SubmitArgs {
    /// Paying student.
    #[arg(long, value_name = "id")]
    pub person: PersonId,
    /// Offering paid for.
    #[arg(long, value_name = "id")]
    pub offering: OfferingId,
    /// Receipt image or PDF.
    #[arg(long, value_name = "path")]
    pub receipt: PathBuf,
    /// Transaction reference.
    #[arg(long)]
    pub reference: Option<String>,
    /// Payment method; defaults to the configured one.
    #[arg(long)]
    pub method: Option<String>,
    /// Key of an earlier attempt to resume; a new one is generated otherwise.
    #[arg(long, value_name = "uuid")]
    pub key: Option<SubmissionKey>,
}

/// `enrollments` subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum EnrollmentCommand {
    /// Enrollments of a person.
    List {
        /// Student.
        person: PersonId,
    },
    /// Modules, grades, attendance, and material of one enrollment.
    Overview {
        /// Enrollment.
        enrollment: EnrollmentId,
    },
    /// Recompute the academic result and store it.
    Sync {
        /// Enrollment.
        enrollment: EnrollmentId,
    },
}

/// `certificates` subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum CertificateCommand {
    /// Download the certificate of an approved enrollment.
    Download {
        /// Enrollment.
        enrollment: EnrollmentId,
        /// Directory receiving the PDF.
        #[arg(long, value_name = "dir", default_value = ".")]
        output: PathBuf,
    },
}

/// `grades` subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum GradeCommand {
    /// Grades of every student in a module.
    Roster {
        /// Module.
        #[arg(long, value_name = "id")]
        module: ModuleId,
        /// Offering.
        #[arg(long, value_name = "id")]
        offering: OfferingId,
    },
    /// Set one student's grade.
    Set {
        /// Student.
        #[arg(long, value_name = "id")]
        person: PersonId,
        /// Offering.
        #[arg(long, value_name = "id")]
        offering: OfferingId,
        /// Module.
        #[arg(long, value_name = "id")]
        module: ModuleId,
        /// `Pendiente`, `Aprobó`, or `Desaprobó`.
        #[arg(long)]
        state: GradeState,
    },
}

/// `attendance` subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum AttendanceCommand {
    /// Attendance history of an enrollment.
    History {
        /// Student.
        #[arg(long, value_name = "id")]
        person: PersonId,
        /// Enrollment.
        #[arg(long, value_name = "id")]
        enrollment: EnrollmentId,
    },
    /// Record presence for one day.
    Record {
        /// Student.
        #[arg(long, value_name = "id")]
        person: PersonId,
        /// Enrollment.
        #[arg(long, value_name = "id")]
        enrollment: EnrollmentId,
        /// Session day, `YYYY-MM-DD`.
        #[arg(long)]
        date: NaiveDate,
        /// `Si` or `No`.
        #[arg(long)]
        presence: Presence,
    },
}

/// `teachers` subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum TeacherCommand {
    /// Register a person as a teacher.
    Register {
        /// Person.
        #[arg(long, value_name = "id")]
        person: PersonId,
        /// Area of expertise.
        #[arg(long)]
        specialty: Option<String>,
        /// Contract start, `YYYY-MM-DD`.
        #[arg(long)]
        hired: Option<NaiveDate>,
        /// Contract end, `YYYY-MM-DD`.
        #[arg(long)]
        terminated: Option<NaiveDate>,
    },
    /// Assign a teacher to a module.
    Assign {
        /// Module.
        #[arg(long, value_name = "id")]
        module: ModuleId,
        /// Teacher record.
        #[arg(long, value_name = "id")]
        teacher: TeacherId,
        /// Offering of the module.
        #[arg(long, value_name = "id")]
        offering: OfferingId,
    },
    /// Offerings a person teaches in.
    Offerings {
        /// Teacher's person id.
        person: PersonId,
    },
}

/// `courses` subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum CourseCommand {
    /// Catalogue courses.
    List,
    /// Students with an active enrollment in an offering.
    Students {
        /// Offering.
        offering: OfferingId,
    },
}

/// `support` subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum SupportCommand {
    /// Material of an offering.
    List {
        /// Offering.
        offering: OfferingId,
    },
    /// Publish new material.
    Publish(SupportDraftArgs),
    /// Replace existing material.
    Revise {
        /// Content to replace.
        content: ContentId,
        /// New values.
        #[command(flatten)]
        draft: SupportDraftArgs,
    },
    /// Remove material.
    Remove {
        /// Content to remove.
        content: ContentId,
    },
}

/// Fields of a support content draft.
#[derive(Debug, Clone, Args)]
pub struct SupportDraftArgs {
    /// Offering the material belongs to.
    #[arg(long, value_name = "id")]
    pub offering: OfferingId,
    /// Title.
    #[arg(long)]
    pub title: String,
    /// Description.
    #[arg(long)]
    pub description: Option<String>,
    /// Link to the material.
    #[arg(long)]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_grade_states_in_spanish() {
        let cli = Cli::try_parse_from([
            "portal-admin", "grades", "set", "--person", "7", "--offering", "3", "--module", "11",
            "--state", "Aprobó",
        ])
        .expect("parses");
        let Command::Grades(GradeCommand::Set { state, .. }) = cli.command else {
            panic!("unexpected command {:?}", cli.command);
        };
        assert_eq!(state, GradeState::Passed);
    }

    #[rstest]
    #[case::bad_id(&["portal-admin", "payments", "approve", "abc"])]
    #[case::bad_key(&["portal-admin", "payments", "submit", "--person", "7", "--offering", "3",
        "--receipt", "r.png", "--key", "nope"])]
    #[case::bad_presence(&["portal-admin", "attendance", "record", "--person", "7",
        "--enrollment", "40", "--date", "2024-02-03", "--presence", "tal vez"])]
    fn rejects_malformed_arguments(#[case] argv: &[&str]) {
        assert!(Cli::try_parse_from(argv).is_err());
    }
}
