use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "persons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub first_name: String,

    pub last_name: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    pub picture: Option<String>,

    /// Raw capture from the fingerprint reader
    pub biometric_fingerprint: Option<Vec<u8>>,

    /// Plain reference without a foreign key; a deleted category leaves it dangling.
    pub category_id: Option<i32>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::person_roles::Entity")]
    PersonRoles,
}

impl Related<super::person_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PersonRoles.def()
    }
}

impl Related<super::roles::Entity> for Entity {
    fn to() -> RelationDef {
        super::person_roles::Relation::Role.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::person_roles::Relation::Person.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
