use crate::clients::ClientStore;
use crate::error::BookingError;
use crate::models::{ClientRow, ContactInfo};
use crate::store::StoreError;

/// Maps incoming contact details to a durable client record, keyed by email.
///
/// An existing client is refreshed with the submitted name/phone/address
/// (repeat bookings often carry a new phone number). A first-time booking
/// needs name, email and phone; the insert relies on the unique email index,
/// so a lost race against a concurrent first booking falls back to looking
/// the winner up.
pub async fn resolve_or_create(
    clients: &ClientStore,
    contact: &ContactInfo,
) -> Result<ClientRow, BookingError> {
    let email = contact
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or(BookingError::MissingContactInfo)?;

    if let Some(existing) = clients.find_by_email(email).await? {
        return refresh(clients, existing, contact).await;
    }

    let name = required(&contact.name)?;
    let phone = required(&contact.phone)?;

    match clients.insert(name, email, phone, contact.address.as_deref()).await {
        Ok(row) => Ok(row),
        Err(StoreError::Duplicate(_)) => {
            // Someone else inserted this email between our lookup and the
            // insert; their row wins.
            let row = clients
                .find_by_email(email)
                .await?
                .ok_or(BookingError::NotFound("client"))?;
            refresh(clients, row, contact).await
        }
        Err(err) => Err(err.into()),
    }
}

async fn refresh(
    clients: &ClientStore,
    existing: ClientRow,
    contact: &ContactInfo,
) -> Result<ClientRow, BookingError> {
    let name = contact.name.as_deref().unwrap_or(&existing.name);
    let phone = contact.phone.as_deref().unwrap_or(&existing.phone);
    if name == existing.name && phone == existing.phone && contact.address.is_none() {
        return Ok(existing);
    }
    clients
        .update_contact(&existing.id, name, phone, contact.address.as_deref())
        .await?;
    Ok(ClientRow {
        name: name.to_string(),
        phone: phone.to_string(),
        address: contact.address.clone().or(existing.address),
        ..existing
    })
}

fn required(field: &Option<String>) -> Result<&str, BookingError> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(BookingError::MissingContactInfo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::client_store;

    fn contact(name: &str, email: &str, phone: &str) -> ContactInfo {
        ContactInfo {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            phone: Some(phone.to_string()),
            address: None,
        }
    }

    #[tokio::test]
    async fn same_email_resolves_to_same_client() {
        let clients = client_store().await;
        let first = resolve_or_create(&clients, &contact("Ana", "a@x.com", "111"))
            .await
            .unwrap();
        let second = resolve_or_create(&clients, &contact("Ana", "a@x.com", "111"))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(clients.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn repeat_booking_refreshes_mutable_fields() {
        let clients = client_store().await;
        let first = resolve_or_create(&clients, &contact("Ana", "a@x.com", "111"))
            .await
            .unwrap();
        let second = resolve_or_create(&clients, &contact("Ana Maria", "a@x.com", "222"))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);

        let stored = clients.find_by_id(&first.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Ana Maria");
        assert_eq!(stored.phone, "222");
    }

    #[tokio::test]
    async fn first_booking_requires_full_contact() {
        let clients = client_store().await;
        let missing_phone = ContactInfo {
            name: Some("Ana".to_string()),
            email: Some("a@x.com".to_string()),
            phone: None,
            address: None,
        };
        let err = resolve_or_create(&clients, &missing_phone).await.unwrap_err();
        assert!(matches!(err, BookingError::MissingContactInfo));

        let err = resolve_or_create(&clients, &ContactInfo::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::MissingContactInfo));
    }

    #[tokio::test]
    async fn known_email_needs_no_other_fields() {
        let clients = client_store().await;
        let first = resolve_or_create(&clients, &contact("Ana", "a@x.com", "111"))
            .await
            .unwrap();

        let email_only = ContactInfo {
            email: Some("a@x.com".to_string()),
            ..ContactInfo::default()
        };
        let resolved = resolve_or_create(&clients, &email_only).await.unwrap();
        assert_eq!(resolved.id, first.id);
    }
}
