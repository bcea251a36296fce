use shared_types::*;
use std::fs;
use std::path::Path;
use ts_rs::TS;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Generate TypeScript definitions for API types
    let mut types = Vec::new();

    // Prospect types
    types.push(clean_type(Prospect::export_to_string()?));
    types.push(clean_type(AlignmentTier::export_to_string()?));
    types.push(clean_type(DiscoveryPreferences::export_to_string()?));
    types.push(clean_type(DiscoveryResponse::export_to_string()?));
    types.push(clean_type(ProspectSort::export_to_string()?));
    types.push(clean_type(ListProspectsRequest::export_to_string()?));
    types.push(clean_type(TierCounts::export_to_string()?));
    types.push(clean_type(ProspectsResponse::export_to_string()?));

    // Email types
    types.push(clean_type(EmailStatus::export_to_string()?));
    types.push(clean_type(EmailMessage::export_to_string()?));
    types.push(clean_type(EmailDraft::export_to_string()?));
    types.push(clean_type(DraftCreatedResponse::export_to_string()?));
    types.push(clean_type(SendEmailRequest::export_to_string()?));
    types.push(clean_type(Sentiment::export_to_string()?));
    types.push(clean_type(ReplyEnvelope::export_to_string()?));
    types.push(clean_type(ReplyAnalysis::export_to_string()?));
    types.push(clean_type(SuggestedFollowup::export_to_string()?));
    types.push(clean_type(EmailAnalysis::export_to_string()?));
    types.push(clean_type(RepliesResponse::export_to_string()?));
    types.push(clean_type(SendFollowupRequest::export_to_string()?));
    types.push(clean_type(EmailsResponse::export_to_string()?));
    types.push(clean_type(MarkRepliedRequest::export_to_string()?));

    // Meeting types
    types.push(clean_type(MeetingStatus::export_to_string()?));
    types.push(clean_type(ItemList::export_to_string()?));
    types.push(clean_type(Meeting::export_to_string()?));
    types.push(clean_type(MeetingDetail::export_to_string()?));
    types.push(clean_type(AddBotRequest::export_to_string()?));
    types.push(clean_type(MeetingsResponse::export_to_string()?));
    types.push(clean_type(KnowledgeBaseQuery::export_to_string()?));
    types.push(clean_type(KnowledgeBaseSource::export_to_string()?));
    types.push(clean_type(KnowledgeBaseAnswer::export_to_string()?));
    types.push(clean_type(ResolvedSource::export_to_string()?));
    types.push(clean_type(KnowledgeBaseSearchResponse::export_to_string()?));

    // Calendar types
    types.push(clean_type(EventAttendee::export_to_string()?));
    types.push(clean_type(CalendarEvent::export_to_string()?));
    types.push(clean_type(NewEventForm::export_to_string()?));
    types.push(clean_type(NewEvent::export_to_string()?));
    types.push(clean_type(CalendarEventsResponse::export_to_string()?));
    types.push(clean_type(ListEventsRequest::export_to_string()?));
    types.push(clean_type(CalendarView::export_to_string()?));

    // Account + dashboard types
    types.push(clean_type(ConnectionStatus::export_to_string()?));
    types.push(clean_type(AuthUrlResponse::export_to_string()?));
    types.push(clean_type(AggregateStats::export_to_string()?));
    types.push(clean_type(RecentActivity::export_to_string()?));
    types.push(clean_type(DashboardSnapshot::export_to_string()?));

    let output_dir = Path::new("../dashboard/src/api-types");
    fs::create_dir_all(output_dir)?;

    let output_path = output_dir.join("types.ts");
    let output = types.join("\n\n");

    fs::write(&output_path, output)?;
    println!("Generated TypeScript types in {}", output_path.display());

    Ok(())
}

/// Everything lands in one file, so per-type imports and banners go.
fn clean_type(mut type_def: String) -> String {
    type_def.retain(|c| c != '\r');

    let filtered: Vec<&str> = type_def
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("import type")
                && !trimmed.starts_with("// This file was generated")
                && !trimmed.starts_with("/* This file was generated")
        })
        .collect();

    let result = filtered.join("\n").trim().to_string();
    if result.is_empty() {
        result
    } else {
        format!("{}\n", result)
    }
}
