//! Plain `key=value` rendering of command results.

use crate::domain::{
    AcademicSnapshot, ApprovalReport, Attendance, Course, CourseOffering, CourseOverview,
    Enrollment, ModuleAssignment, ModuleGrade, Payment, Person, StepOutcome, SubmissionOutcome,
    SupportContent, TeacherRegistration,
};

pub(super) fn lines(lines: Vec<String>) -> String {
    lines.join("\n")
}

pub(super) fn payments(payments: &[Payment]) -> String {
    if payments.is_empty() {
        return "no payments".to_owned();
    }
    lines(payments.iter().map(payment).collect())
}

fn payment(payment: &Payment) -> String {
    format!(
        "payment={} person={} enrollment={} amount={} method={} status={}",
        payment.id,
        payment.person_id,
        payment.enrollment_id,
        payment.amount,
        payment.method,
        payment.status
    )
}

pub(super) fn approval(report: &ApprovalReport) -> String {
    let mut out = vec![
        report.message(),
        format!("payment={}", report.payment_id),
        format!("payment_status={}", report.payment_status),
    ];
    if let Some(status) = report.enrollment_status {
        out.push(format!("enrollment_status={status}"));
    }
    if let Some(quota) = report.remaining_quota {
        out.push(format!("remaining_quota={}", quota.seats()));
    }
    out.extend(report.steps.iter().map(|(step, outcome)| {
        let rendered = match outcome {
            StepOutcome::Applied => "applied".to_owned(),
            StepOutcome::Skipped { reason } => format!("skipped ({reason})"),
            StepOutcome::Failed { message } => format!("failed ({message})"),
        };
        format!("step.{}={rendered}", step.as_str())
    }));
    lines(out)
}

pub(super) fn submission(outcome: &SubmissionOutcome) -> String {
    let mut out = vec![
        format!("key={}", outcome.key),
        format!("enrollment={}", outcome.enrollment_id),
        format!("payment={}", outcome.payment_id),
        format!("receipt={}", outcome.receipt.public_url),
        format!("replayed={}", outcome.replayed),
    ];
    out.extend(outcome.warnings.iter().map(|warning| format!("warning={warning}")));
    lines(out)
}

pub(super) fn enrollments(enrollments: &[Enrollment]) -> String {
    if enrollments.is_empty() {
        return "no enrollments".to_owned();
    }
    lines(
        enrollments
            .iter()
            .map(|enrollment| {
                format!(
                    "enrollment={} offering={} status={} result={}",
                    enrollment.id, enrollment.offering_id, enrollment.status, enrollment.result
                )
            })
            .collect(),
    )
}

pub(super) fn snapshot(snapshot: &AcademicSnapshot) -> String {
    lines(vec![
        format!("result={}", snapshot.result),
        format!(
            "progress={}% ({}/{})",
            snapshot.progress_percent, snapshot.evaluated, snapshot.total_modules
        ),
        format!(
            "approval={}% ({}/{})",
            snapshot.approval_percent, snapshot.passed, snapshot.evaluated
        ),
    ])
}

pub(super) fn overview(overview: &CourseOverview) -> String {
    let enrollment = &overview.enrollment;
    let mut out = vec![
        format!("enrollment={}", enrollment.id),
        format!("status={}", enrollment.status),
        snapshot(&overview.snapshot),
    ];
    out.extend(overview.modules.iter().map(|progress| {
        let teacher = progress
            .teacher
            .as_ref()
            .map_or_else(|| "sin asignar".to_owned(), teacher_label);
        format!(
            "module.{}={} grade={} teacher={teacher}",
            progress.module.id, progress.module.name, progress.grade
        )
    }));
    out.push(format!(
        "attendance={}% ({} sessions)",
        overview.attendance_percent,
        overview.attendance.len()
    ));
    out.extend(overview.contents.iter().map(content));
    out.push(format!("result_written={}", overview.result_written));
    out.push(format!("certificate_eligible={}", overview.certificate_eligible));
    out.extend(overview.warnings.iter().map(|warning| format!("warning={warning}")));
    lines(out)
}

fn teacher_label(assignment: &ModuleAssignment) -> String {
    assignment
        .teacher_name
        .clone()
        .unwrap_or_else(|| format!("docente {}", assignment.teacher_id))
}

pub(super) fn grades(grades: &[ModuleGrade]) -> String {
    if grades.is_empty() {
        return "no grades".to_owned();
    }
    lines(grades.iter().map(grade).collect())
}

pub(super) fn grade(grade: &ModuleGrade) -> String {
    format!(
        "grade={} person={} module={} state={}",
        grade.id, grade.person_id, grade.module_id, grade.state
    )
}

pub(super) fn attendance_history(records: &[Attendance], percent: u8) -> String {
    let mut out: Vec<String> = records.iter().map(attendance).collect();
    out.push(format!("attendance={percent}% ({} sessions)", records.len()));
    lines(out)
}

pub(super) fn attendance(record: &Attendance) -> String {
    format!(
        "attendance={} date={} presence={}",
        record.id, record.date, record.presence
    )
}

pub(super) fn registration(registration: &TeacherRegistration) -> String {
    lines(vec![
        registration.message.clone(),
        format!("teacher={}", registration.teacher.id),
        format!("person={}", registration.teacher.person_id),
        format!("role_updated={}", registration.role_updated),
    ])
}

pub(super) fn assignment(assignment: &ModuleAssignment) -> String {
    format!(
        "assignment={} module={} teacher={} offering={}",
        assignment.id, assignment.module_id, assignment.teacher_id, assignment.offering_id
    )
}

pub(super) fn offerings(offerings: &[CourseOffering]) -> String {
    if offerings.is_empty() {
        return "no offerings".to_owned();
    }
    lines(
        offerings
            .iter()
            .map(|offering| {
                format!(
                    "offering={} course={} seats={}",
                    offering.id,
                    offering.label(),
                    offering.quota.seats()
                )
            })
            .collect(),
    )
}

pub(super) fn courses(courses: &[Course]) -> String {
    if courses.is_empty() {
        return "no courses".to_owned();
    }
    lines(
        courses
            .iter()
            .map(|course| format!("course={} name={}", course.id, course.name))
            .collect(),
    )
}

pub(super) fn people(people: &[Person]) -> String {
    if people.is_empty() {
        return "no students".to_owned();
    }
    lines(
        people
            .iter()
            .map(|person| format!("person={} name={}", person.id, person.full_name()))
            .collect(),
    )
}

pub(super) fn contents(contents: &[SupportContent]) -> String {
    if contents.is_empty() {
        return "no content".to_owned();
    }
    lines(contents.iter().map(content).collect())
}

pub(super) fn content(content: &SupportContent) -> String {
    format!(
        "content={} title={} url={}",
        content.id,
        content.title,
        content.url.as_deref().unwrap_or("-")
    )
}
