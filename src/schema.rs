diesel::table! {
    accounts (id) {
        id -> Integer,
        platform_id -> Integer,
        remark -> Nullable<Text>,
        login_name -> Nullable<Text>,
        password -> Text,
        pay_password -> Nullable<Text>,
        phone -> Nullable<Text>,
        email -> Nullable<Text>,
        id_number -> Nullable<Text>,
    }
}

diesel::table! {
    platforms (id) {
        id -> Integer,
        name -> Text,
        platform_type -> Nullable<Text>,
        sort_index -> Integer,
    }
}

diesel::joinable!(accounts -> platforms (platform_id));

diesel::allow_tables_to_appear_in_same_query!(accounts, platforms);
