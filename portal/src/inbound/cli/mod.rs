//! `portal-admin` command surface.
//!
//! [`Cli`] is the clap grammar; [`PortalApp`] maps each parsed command onto a
//! domain service and renders the outcome as `key=value` lines. The binary
//! only wires adapters and prints.

mod app;
mod args;
mod files;
mod render;

pub use app::{PortalApp, PortalPorts};
pub use args::{
    AttendanceCommand, CertificateCommand, Cli, Command, CourseCommand, EnrollmentCommand,
    GradeCommand, PaymentCommand, SubmitArgs, SupportCommand, SupportDraftArgs, TeacherCommand,
};
