diesel::table! {
    translations (id) {
        id -> Int4,
        original_message -> Text,
        translated_message -> Text,
        #[max_length = 50]
        language -> Varchar,
        #[max_length = 50]
        model -> Varchar,
        ranking -> Nullable<Int4>,
        rating -> Nullable<Float8>,
        #[max_length = 50]
        classification -> Nullable<Varchar>,
        created_at -> Timestamp,
    }
}
