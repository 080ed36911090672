//! Plain-text rendering for the intake CLI.

use intake_core::classifier::Classification;
use intake_core::directory::PatientDirectory;
use intake_core::patient::MetricReading;
use intake_core::{AssignedEvent, HealthSummary, Patient, Referral};
use std::io::{self, Write};

fn or_dash(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => "-",
    }
}

fn reading_line(reading: &MetricReading) -> String {
    format!(
        "{:<16}{:<22}{} [{}]",
        reading.metric,
        reading.value.as_deref().unwrap_or("-"),
        reading.category,
        reading.color
    )
}

pub fn event(out: &mut impl Write, event: &AssignedEvent) -> io::Result<()> {
    writeln!(out, "{} ({})", event.event_name, event.id)?;
    writeln!(out, "  Code:       {}", or_dash(event.event_code.as_deref()))?;
    writeln!(out, "  Date:       {}", or_dash(event.event_date.as_deref()))?;
    writeln!(out, "  Venue:      {}", or_dash(event.venue.as_deref()))?;
    writeln!(out, "  Client:     {}", or_dash(event.client_name.as_deref()))?;
    writeln!(out, "  Email:      {}", or_dash(event.client_email.as_deref()))?;
    writeln!(out, "  Phone:      {}", or_dash(event.client_phone.as_deref()))?;
    writeln!(
        out,
        "  Attendees:  {}",
        event
            .number_of_attendees
            .map_or_else(|| "-".to_string(), |n| n.to_string())
    )?;
    writeln!(
        out,
        "  Status:     {}",
        event.status.map_or("-", |s| s.as_str())
    )?;
    if let Some(notes) = event.additional_notes.as_deref().filter(|n| !n.trim().is_empty()) {
        writeln!(out, "  Notes:      {notes}")?;
    }
    Ok(())
}

/// The current directory page with a BMI and blood pressure badge per row.
pub fn patient_page(out: &mut impl Write, directory: &PatientDirectory) -> io::Result<()> {
    let items = directory.page_items();
    if items.is_empty() {
        return writeln!(out, "No patients found.");
    }

    writeln!(
        out,
        "{:<28}{:<16}{:<22}{}",
        "Name", "ID number", "BMI", "Blood pressure"
    )?;
    for patient in items {
        let info = &patient.medical_info;
        let bmi = info.bmi_category();
        let bp = info.blood_pressure_category();
        writeln!(
            out,
            "{:<28}{:<16}{:<22}{}",
            patient.personal_info.display_name(),
            patient.personal_info.id_number,
            format!("{} [{}]", bmi.label(), bmi.color()),
            format!("{} [{}]", bp.label(), bp.color()),
        )?;
    }

    writeln!(
        out,
        "Page {} of {} ({} matching){}{}",
        directory.current_page(),
        directory.total_pages(),
        directory.filtered().len(),
        if directory.has_previous() { ", previous available" } else { "" },
        if directory.has_next() { ", next available" } else { "" },
    )
}

pub fn patient_detail(out: &mut impl Write, patient: &Patient) -> io::Result<()> {
    let personal = &patient.personal_info;
    writeln!(out, "{}", personal.display_name())?;
    writeln!(out, "  ID number:      {}", personal.id_number)?;
    writeln!(out, "  Date of birth:  {}", or_dash(Some(personal.date_of_birth.as_str())))?;
    writeln!(out, "  Sex:            {}", or_dash(Some(personal.sex.as_str())))?;
    writeln!(out, "  Email:          {}", or_dash(Some(personal.email.as_str())))?;
    writeln!(out, "  Phone:          {}", or_dash(Some(personal.phone.as_str())))?;

    let aid = &patient.medical_aid_details;
    writeln!(out, "Medical aid")?;
    writeln!(out, "  Scheme:         {}", or_dash(aid.scheme_name.as_deref()))?;
    writeln!(out, "  Plan/option:    {}", or_dash(aid.plan_option.as_deref()))?;
    writeln!(out, "  Membership no.: {}", or_dash(aid.membership_number.as_deref()))?;
    writeln!(out, "  Main member:    {}", or_dash(aid.main_member_name.as_deref()))?;
    writeln!(out, "  Member address: {}", or_dash(aid.main_member_address.as_deref()))?;
    writeln!(out, "  Dependent code: {}", or_dash(aid.dependent_code.as_deref()))?;

    let info = &patient.medical_info;
    writeln!(out, "Screening")?;
    for reading in info.readings() {
        writeln!(out, "  {}", reading_line(&reading))?;
    }
    writeln!(
        out,
        "  {:<16}{}",
        "Cholesterol",
        info.cholesterol
            .map_or_else(|| "-".to_string(), |c| format!("{c} mg/dL"))
    )?;
    writeln!(
        out,
        "  {:<16}{}",
        "HIV status",
        info.hiv_status.map_or("-", |s| s.as_str())
    )?;

    if !patient.mental_health_assessment.is_empty() {
        writeln!(out, "Mental health")?;
        for entry in &patient.mental_health_assessment {
            writeln!(out, "  Q: {}", entry.question)?;
            writeln!(out, "  A: {}", or_dash(Some(entry.answer.as_str())))?;
        }
    }
    writeln!(
        out,
        "Consent signature: {}",
        if patient.consent_signature.is_some() { "captured" } else { "missing" }
    )
}

pub fn referrals(out: &mut impl Write, referrals: &[Referral]) -> io::Result<()> {
    if referrals.is_empty() {
        return writeln!(out, "No referrals for this event.");
    }
    writeln!(
        out,
        "{:<16}{:<24}{:<30}{:<20}{}",
        "ID number", "Practitioner", "Email", "Status", "Created"
    )?;
    for referral in referrals {
        let (label, color) = referral.status_badge();
        writeln!(
            out,
            "{:<16}{:<24}{:<30}{:<20}{}",
            referral.id_number,
            referral.practitioner_name,
            referral.practitioner_email,
            format!("{label} [{color}]"),
            referral
                .created_at
                .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d").to_string()),
        )?;
    }
    Ok(())
}

pub fn summary(out: &mut impl Write, summary: &HealthSummary) -> io::Result<()> {
    writeln!(out, "Patients screened: {}", summary.patients)?;
    for metric in summary.metrics() {
        writeln!(out, "{}", metric.metric)?;
        for bucket in &metric.buckets {
            writeln!(
                out,
                "  {:<16}{:>5}  [{}]",
                bucket.label, bucket.count, bucket.color
            )?;
        }
    }

    writeln!(out, "HIV status")?;
    for (status, count) in &summary.hiv_status {
        writeln!(out, "  {:<16}{:>5}", status.as_str(), count)?;
    }
    writeln!(out, "  {:<16}{:>5}", "Unknown", summary.hiv_unknown)?;

    writeln!(out, "Sex")?;
    for (sex, count) in &summary.sex {
        writeln!(out, "  {:<16}{:>5}", sex, count)?;
    }
    Ok(())
}
