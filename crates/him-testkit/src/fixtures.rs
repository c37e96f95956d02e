//! Ready-made backend entities for seeding a [`MockBackend`](crate::MockBackend).

use chrono::{Duration, Utc};
use him_shared::types::{
    AccountStatus, AuthUser, Buyer, Helper, KycStatus, PendingHelper, Role, SupportTicket, Task,
    TaskDetail, TaskStatus, TicketDetail, TicketMessage, TicketStatus,
};

pub fn admin_user(id: &str) -> AuthUser {
    AuthUser {
        id: Some(id.to_string()),
        email: Some(crate::ADMIN_EMAIL.to_string()),
        phone: Some(crate::ADMIN_PHONE.to_string()),
        role: Some(Role::Admin),
    }
}

pub fn buyer(id: &str) -> Buyer {
    Buyer {
        id: id.to_string(),
        role: Role::Buyer,
        status: AccountStatus::Active,
        phone: Some(format!("90000{id}")),
        email: Some(format!("{}@buyers.test", id.to_lowercase())),
        display_name: Some(format!("Buyer {id}")),
        created_at: Utc::now(),
    }
}

pub fn helper(id: &str) -> Helper {
    Helper {
        id: id.to_string(),
        role: Role::Helper,
        status: AccountStatus::Active,
        phone: Some(format!("80000{id}")),
        email: Some(format!("{}@helpers.test", id.to_lowercase())),
        display_name: Some(format!("Helper {id}")),
        created_at: Utc::now(),
        helper_kyc_status: Some(KycStatus::Approved),
        helper_kyc_full_name: Some(format!("Helper {id}")),
        helper_kyc_id_number: Some(format!("ID-{id}")),
        helper_kyc_doc_front_url: None,
        helper_kyc_doc_back_url: None,
        helper_kyc_selfie_url: None,
        helper_kyc_submitted_at: None,
    }
}

pub fn pending_helper(id: &str) -> PendingHelper {
    PendingHelper {
        helper_id: id.to_string(),
        phone: Some(format!("80000{id}")),
        kyc_status: KycStatus::Pending,
        kyc_full_name: Some(format!("Applicant {id}")),
        kyc_id_number: Some(format!("ID-{id}")),
        kyc_doc_front_url: Some(format!("https://files.test/{id}/front.jpg")),
        kyc_doc_back_url: Some(format!("https://files.test/{id}/back.jpg")),
        kyc_selfie_url: Some(format!("https://files.test/{id}/selfie.jpg")),
        kyc_submitted_at: Some(Utc::now()),
        created_at: Utc::now(),
    }
}

/// A task created `age_minutes` ago with a ₹250 budget.
pub fn task(id: &str, status: TaskStatus, age_minutes: i64) -> TaskDetail {
    let assigned = !matches!(status, TaskStatus::Searching | TaskStatus::Cancelled);
    TaskDetail {
        task: Task {
            id: id.to_string(),
            buyer_id: "B1".to_string(),
            title: format!("Task {id}"),
            description: "Carry groceries upstairs".to_string(),
            urgency: "NORMAL".to_string(),
            time_minutes: 30,
            budget_paise: 25_000,
            lat: 12.9716,
            lng: 77.5946,
            address_text: Some("MG Road, Bengaluru".to_string()),
            status,
            assigned_helper_id: assigned.then(|| "H1".to_string()),
            created_at: Utc::now() - Duration::minutes(age_minutes),
        },
        buyer_name: Some("Buyer B1".to_string()),
        buyer_phone: Some("90000B1".to_string()),
        helper_name: assigned.then(|| "Helper H1".to_string()),
        helper_phone: None,
        arrival_selfie_url: None,
        arrival_selfie_lat: None,
        arrival_selfie_lng: None,
        arrival_selfie_address: None,
        arrival_selfie_captured_at: None,
        completion_selfie_url: None,
        completion_selfie_lat: None,
        completion_selfie_lng: None,
        completion_selfie_address: None,
        completion_selfie_captured_at: None,
    }
}

pub fn ticket(id: &str, status: TicketStatus) -> TicketDetail {
    let now = Utc::now();
    TicketDetail {
        ticket: SupportTicket {
            id: id.to_string(),
            created_by_user_id: "B1".to_string(),
            created_by_role: Role::Buyer,
            created_by_phone: Some("90000B1".to_string()),
            category: "PAYMENT".to_string(),
            subject: Some(format!("Ticket {id}")),
            status,
            priority: "NORMAL".to_string(),
            related_task_id: None,
            assignee_user_id: None,
            last_message_at: now,
            created_at: now,
            updated_at: now,
        },
        messages: vec![TicketMessage {
            id: format!("{id}-M0"),
            author_type: "BUYER".to_string(),
            author_user_id: Some("B1".to_string()),
            message: "I was charged twice".to_string(),
            created_at: now,
        }],
    }
}
