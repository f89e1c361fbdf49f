use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

/// These can be removed when [`serde`] supports
/// literal defaults: <https://github.com/serde-rs/serde/issues/368>
#[inline]
fn one() -> i64 {
	1
}

#[inline]
fn ten() -> i64 {
	10
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct Paginate {
	/// The page number to return (1-indexed).
	#[validate(range(min = 1, max = 100))]
	#[serde(default = "one")]
	pub page: i64,
	/// The number of items to return per page.
	#[validate(range(min = 1, max = 100))]
	#[serde(default = "ten")]
	pub size: i64,
}

impl Paginate {
	pub fn offset(&self) -> i64 {
		(self.page - 1) * self.size
	}

	pub fn limit(&self) -> i64 {
		self.size
	}
}

/// Deserializes any present value, `null` included, as `Some`.
///
/// Paired with `#[serde(default)]` on an `Option<Option<T>>`, a missing field is
/// `None` and an explicit `null` is `Some(None)`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de>,
{
	T::deserialize(deserializer).map(Some)
}

/// A path with a single `:id` parameter.
#[derive(Deserialize, Validate, JsonSchema)]
pub struct IdInput {
	pub id: Uuid,
}

/// The kind of content a report or notification refers to.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ContentType {
	Post,
	Comment,
	User,
}

/// The moderation status of a post or comment. Only active content is listed publicly.
#[derive(
	Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ContentStatus {
	#[default]
	Active,
	Hidden,
	Removed,
}

/// A count, as returned by counting endpoints.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct Count {
	pub count: i64,
}

#[cfg(test)]
mod test {
	#[test]
	fn test_paginate_offset() {
		let mut paginate = super::Paginate { page: 1, size: 10 };

		assert_eq!(paginate.offset(), 0);

		paginate.page = 2;

		assert_eq!(paginate.offset(), 10);

		paginate.size = 5;

		assert_eq!(paginate.offset(), 5);

		paginate.page = 3;

		assert_eq!(paginate.offset(), 10);
	}

	#[test]
	fn test_nullable_distinguishes_null_from_missing() {
		#[derive(serde::Deserialize)]
		struct Input {
			#[serde(default, deserialize_with = "super::nullable")]
			code: Option<Option<String>>,
		}

		let missing = serde_json::from_str::<Input>("{}").unwrap();
		let null = serde_json::from_str::<Input>(r#"{"code":null}"#).unwrap();
		let value = serde_json::from_str::<Input>(r#"{"code":"x"}"#).unwrap();

		assert_eq!(missing.code, None);
		assert_eq!(null.code, Some(None));
		assert_eq!(value.code, Some(Some("x".into())));
	}

	#[test]
	fn test_paginate_limit() {
		let paginate = super::Paginate { page: 1, size: 10 };

		assert_eq!(paginate.limit(), 10);
	}
}
