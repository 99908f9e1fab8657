use super::dto::{
    BatchUpdateRequestDto, BomNodeDto, BomResponseDto, ChecklistItemChangeDto, ChecklistItemDto,
    ChecklistResponseDto, ChecklistStatsDto, ChecklistUpdateDto, RequisiteItemDto,
    RequisiteLineDto, RequisiteRecordDto, SubmitRequisiteDto,
};
use crate::domain::entities::{
    BomNode, BucketEntry, ChecklistItem, ChecklistItemPatch, ChecklistItemUpdate, ChecklistMeta,
    ChecklistSnapshot, ChecklistStats, RequisiteLine, RequisiteRecord, RequisiteSubmission,
};
use crate::domain::value_objects::{ChecklistItemId, ChecklistKey, RequisiteStatus};
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::debug;

pub fn checklist_snapshot_from_dto(
    key: ChecklistKey,
    dto: ChecklistResponseDto,
) -> ChecklistSnapshot {
    if dto.checklist.id != key.checklist_id {
        debug!(
            requested = key.checklist_id,
            returned = dto.checklist.id,
            "checklist id mismatch in response"
        );
    }

    ChecklistSnapshot {
        meta: ChecklistMeta {
            key,
            title: dto.checklist.title.unwrap_or_default(),
            job_title: dto.job_title.unwrap_or_default(),
        },
        items: dto.items.into_iter().map(checklist_item_from_dto).collect(),
        stats: checklist_stats_from_dto(dto.stats),
    }
}

pub fn checklist_item_from_dto(dto: ChecklistItemDto) -> ChecklistItem {
    ChecklistItem {
        id: ChecklistItemId::new(dto.id),
        text: dto.text,
        checked: dto.checked,
        comment: dto.comment,
        document_link: dto.document_link.filter(|link| !link.is_empty()),
        is_approved: dto.is_approved,
        created_at: dto.created_at.as_deref().and_then(parse_timestamp),
        updated_at: dto.updated_at.as_deref().and_then(parse_timestamp),
    }
}

pub fn checklist_stats_from_dto(dto: ChecklistStatsDto) -> ChecklistStats {
    let completion = if dto.completion_percentage.is_finite() {
        dto.completion_percentage.round().clamp(0.0, 100.0) as u32
    } else {
        0
    };
    ChecklistStats {
        total_items: dto.total_items,
        checked_count: dto.checked_count,
        pending_count: dto.pending_count,
        approved_count: dto.approved_count,
        completion_percentage: completion,
    }
}

pub fn item_change_from_patch(patch: ChecklistItemPatch) -> ChecklistItemChangeDto {
    ChecklistItemChangeDto {
        checked: patch.checked,
        comment: patch.comment,
        document_link: patch.document_link,
    }
}

pub fn batch_request_from_updates(updates: Vec<ChecklistItemUpdate>) -> BatchUpdateRequestDto {
    BatchUpdateRequestDto {
        updates: updates
            .into_iter()
            .map(|update| ChecklistUpdateDto {
                checklist_item_id: update.id.value(),
                changes: item_change_from_patch(update.changes),
            })
            .collect(),
    }
}

pub fn bom_from_dto(dto: BomResponseDto) -> Vec<BomNode> {
    let nodes = match dto {
        BomResponseDto::Nodes(nodes) => nodes,
        BomResponseDto::Wrapped { bom } => bom,
    };
    nodes.into_iter().map(bom_node_from_dto).collect()
}

fn bom_node_from_dto(dto: BomNodeDto) -> BomNode {
    BomNode {
        product_name: dto.product_name,
        cabinet_position: dto.cabinet_position,
        quantity: dto.quantity,
        children: dto
            .children
            .unwrap_or_default()
            .into_iter()
            .map(bom_node_from_dto)
            .collect(),
    }
}

pub fn submit_request_from_domain(submission: RequisiteSubmission) -> SubmitRequisiteDto {
    let RequisiteSubmission { details, items } = submission;
    SubmitRequisiteDto {
        sales_order: details.sales_order,
        cabinet_position: details.cabinet_position,
        sr_poc: details.sr_poc,
        items: items.into_iter().map(requisite_item_from_entry).collect(),
    }
}

fn requisite_item_from_entry(entry: BucketEntry) -> RequisiteItemDto {
    RequisiteItemDto {
        product_name: entry.product_name.into(),
        quantity: entry.quantity,
        issue_description: entry.issue_description,
        responsible_department: entry.responsible_department,
    }
}

pub fn requisite_record_from_dto(dto: RequisiteRecordDto) -> RequisiteRecord {
    RequisiteRecord {
        id: dto.id,
        sales_order: dto.sales_order,
        sr_poc: dto.sr_poc.filter(|poc| !poc.is_empty()),
        status: dto
            .status
            .map(RequisiteStatus::from)
            .unwrap_or(RequisiteStatus::Pending),
        created_date: dto.created_date.as_deref().and_then(parse_timestamp),
        closed_date: dto.closed_date.as_deref().and_then(parse_timestamp),
        site_requisites: dto
            .site_requisites
            .into_iter()
            .map(requisite_line_from_dto)
            .collect(),
    }
}

fn requisite_line_from_dto(dto: RequisiteLineDto) -> RequisiteLine {
    RequisiteLine {
        id: dto.id,
        product_name: dto.product_name,
        quantity: dto.quantity,
        issue_description: dto.issue_description.unwrap_or_default(),
        responsible_department: dto.responsible_department.unwrap_or_default(),
    }
}

/// Accepts RFC 3339 as well as naive ISO timestamps, which are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}
