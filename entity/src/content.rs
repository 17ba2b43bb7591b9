//! Entity for catalog content records (podcasts, documentaries).
//!
//! Rows are never removed; `deleted_at` marks a record as soft-deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "content")]
pub struct Model {
    /// UUID assigned at creation
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: String,

    pub description: Option<String>,

    /// Short language code, e.g. "en"
    pub language: Option<String>,

    pub duration_seconds: Option<i32>,

    /// Absent while the content is unpublished
    pub published_at: Option<DateTimeWithTimeZone>,

    /// One of "podcast" or "documentary"
    pub content_type: String,

    /// External URL of the media
    pub url: Option<String>,

    pub platform_name: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,

    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::content_tag::Entity")]
    ContentTag,
}

impl Related<super::content_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContentTag.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::content_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::content_tag::Relation::Content.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
