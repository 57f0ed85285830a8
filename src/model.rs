pub mod attendance;
pub mod daily_status;
pub mod report;
pub mod role;
pub mod student;
pub mod user;

/// Maps strum enums onto plain text columns for every sqlx backend.
///
/// The derived `sqlx::Type` only matches native MySQL ENUM columns, so the
/// VARCHAR columns used here are read as `&str` and parsed with `FromStr`.
macro_rules! impl_text_column {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl<DB: sqlx::Database> sqlx::Type<DB> for $ty
            where
                str: sqlx::Type<DB>,
            {
                fn type_info() -> DB::TypeInfo {
                    <str as sqlx::Type<DB>>::type_info()
                }

                fn compatible(ty: &DB::TypeInfo) -> bool {
                    <str as sqlx::Type<DB>>::compatible(ty)
                }
            }

            impl<'q, DB: sqlx::Database> sqlx::Encode<'q, DB> for $ty
            where
                String: sqlx::Encode<'q, DB>,
            {
                fn encode_by_ref(
                    &self,
                    buf: &mut <DB as sqlx::database::HasArguments<'q>>::ArgumentBuffer,
                ) -> sqlx::encode::IsNull {
                    <String as sqlx::Encode<'q, DB>>::encode_by_ref(&self.to_string(), buf)
                }
            }

            impl<'r, DB: sqlx::Database> sqlx::Decode<'r, DB> for $ty
            where
                &'r str: sqlx::Decode<'r, DB>,
            {
                fn decode(
                    value: <DB as sqlx::database::HasValueRef<'r>>::ValueRef,
                ) -> Result<Self, sqlx::error::BoxDynError> {
                    let text = <&'r str as sqlx::Decode<'r, DB>>::decode(value)?;
                    Ok(<$ty as std::str::FromStr>::from_str(text)?)
                }
            }
        )+
    };
}

impl_text_column!(
    attendance::AttendanceStatus,
    daily_status::DailyStatus,
    role::Role,
);

#[cfg(test)]
mod tests {
    use sqlx::{MySql, Sqlite, Type};

    use super::{attendance::AttendanceStatus, daily_status::DailyStatus, role::Role};

    fn mysql_accepts_varchar<T: Type<MySql>>() -> bool {
        T::compatible(&<String as Type<MySql>>::type_info())
    }

    fn sqlite_accepts_text<T: Type<Sqlite>>() -> bool {
        T::compatible(&<String as Type<Sqlite>>::type_info())
    }

    #[test]
    fn enum_columns_read_from_mysql_varchar() {
        assert!(mysql_accepts_varchar::<Role>());
        assert!(mysql_accepts_varchar::<AttendanceStatus>());
        assert!(mysql_accepts_varchar::<DailyStatus>());
    }

    #[test]
    fn enum_columns_read_from_sqlite_text() {
        assert!(sqlite_accepts_text::<Role>());
        assert!(sqlite_accepts_text::<AttendanceStatus>());
        assert!(sqlite_accepts_text::<DailyStatus>());
    }
}
