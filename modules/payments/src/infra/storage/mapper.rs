use crate::domain::model::StoredCard;
use crate::infra::storage::entities::cards;

pub fn card_from_row(row: cards::Model) -> StoredCard {
    StoredCard {
        id: row.id,
        user_id: row.user_id,
        card_holder: row.card_holder,
        encrypted_number: row.encrypted_number,
        masked_number: row.masked_number,
        expires: row.expires,
        created_at: row.created_at,
    }
}
