//! Strongly-typed ID newtypes.
//!
//! Each entity gets its own wrapper around `Uuid`, so a `StudentId` cannot be
//! passed where a `CourseId` is expected. The wrappers are transparent on the
//! wire and in Postgres.

use serde::{Deserialize, Serialize};
use sqlx::{
    Database, Decode, Encode, Type,
    postgres::{PgHasArrayType, PgTypeInfo},
};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
        #[serde(transparent)]
        #[schema(value_type = String, format = "uuid")]
        pub struct $name(pub Uuid);

        impl $name {
            #[inline]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[inline]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            #[inline]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            #[inline]
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            #[inline]
            fn from(id: $name) -> Uuid {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl Type<sqlx::Postgres> for $name {
            fn type_info() -> PgTypeInfo {
                <Uuid as Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <Uuid as Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'q> Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <Uuid as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }

        impl<'r> Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: <sqlx::Postgres as Database>::ValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                <Uuid as Decode<'r, sqlx::Postgres>>::decode(value).map(Self)
            }
        }

        impl PgHasArrayType for $name {
            fn array_type_info() -> PgTypeInfo {
                <Uuid as PgHasArrayType>::array_type_info()
            }
        }
    };
}

define_id!(
    /// A login account of any role.
    UserId
);
define_id!(StudentId);
define_id!(FacultyId);
define_id!(SubjectId);
define_id!(CourseId);
define_id!(AttendanceId);
define_id!(GradeId);
define_id!(AdmissionId);
define_id!(FeeStructureId);
define_id!(FeePaymentId);
define_id!(PaymentIntentId);
define_id!(CalendarEventId);
define_id!(TransportRouteId);

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: u128 = 0x12345678_1234_1234_1234_123456789abc;
    const TEXT: &str = "12345678-1234-1234-1234-123456789abc";

    #[test]
    fn test_new_ids_are_unique() {
        assert_ne!(StudentId::new(), StudentId::new());
    }

    #[test]
    fn test_display_and_debug() {
        let id = CourseId::from_uuid(Uuid::from_u128(RAW));
        assert_eq!(id.to_string(), TEXT);
        assert_eq!(format!("{:?}", id), format!("CourseId({})", TEXT));
    }

    #[test]
    fn test_parse() {
        let id: AdmissionId = TEXT.parse().unwrap();
        assert_eq!(id.into_inner(), Uuid::from_u128(RAW));
        assert!("not-a-uuid".parse::<AdmissionId>().is_err());
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = StudentId::from_uuid(Uuid::from_u128(RAW));
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", TEXT));

        let back: StudentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
