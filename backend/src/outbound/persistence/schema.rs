//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts. `email` and `username` carry unique constraints.
    users (id) {
        id -> Uuid,
        #[max_length = 50]
        username -> Varchar,
        #[max_length = 255]
        email -> Varchar,
        /// Argon2id PHC string.
        #[max_length = 255]
        password_hash -> Varchar,
        #[max_length = 255]
        avatar -> Nullable<Varchar>,
        confirmed -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Address book entries, each owned by exactly one user.
    contacts (id) {
        id -> Uuid,
        /// Owning user; rows are removed with their owner.
        user_id -> Uuid,
        #[max_length = 50]
        first_name -> Varchar,
        #[max_length = 50]
        last_name -> Varchar,
        #[max_length = 100]
        email -> Varchar,
        #[max_length = 20]
        phone_number -> Varchar,
        birthday -> Date,
        #[max_length = 150]
        additional_data -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(contacts -> users (user_id));
diesel::allow_tables_to_appear_in_same_query!(contacts, users);
