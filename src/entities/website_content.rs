use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "website_content")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub section: String,

    pub field: String,

    /// `None` once the entry has been cleared.
    pub value: Option<String>,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
