use sea_orm_migration::prelude::extension::postgres::{Type, TypeCreateStatement};
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    Phone,
    IsEmailVerified,
    ReferralCode,
    ReferredBy,
    WalletBalance,
    Role,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Packages {
    Table,
    Id,
    Title,
    Slug,
    Description,
    Duration,
    CategoryAndPrice,
    FeaturedImage,
    Destinations,
    Itinerary,
    Activities,
    AvailableDates,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Enquiries {
    Table,
    Id,
    Name,
    Email,
    Phone,
    NoOfGuests,
    CheckInDate,
    CheckOutDate,
    PackageId,
    Message,
    Status,
    AssignedTo,
    Source,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CallbackRequests {
    Table,
    Id,
    Name,
    Phone,
    PreferredTime,
    Message,
    Destination,
    Status,
    CalledAt,
    AssignedTo,
    Source,
    IpAddress,
    UserAgent,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

fn enum_type(name: &str, values: &[&str]) -> TypeCreateStatement {
    Type::create()
        .as_enum(Alias::new(name))
        .values(values.iter().map(|v| Alias::new(*v)).collect::<Vec<_>>())
        .to_owned()
}

fn timestamps<T: IntoIden>(table: &mut TableCreateStatement, created: T, updated: T) {
    table
        .col(
            ColumnDef::new(created)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::cust("NOW()")),
        )
        .col(
            ColumnDef::new(updated)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::cust("NOW()")),
        );
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // enums
        manager
            .create_type(enum_type(
                "user_role",
                &["user", "admin", "manager", "employee"],
            ))
            .await?;
        manager
            .create_type(enum_type(
                "enquiry_status",
                &["pending", "followup", "confirmed", "solved", "rejected"],
            ))
            .await?;
        manager
            .create_type(enum_type(
                "enquiry_source",
                &["website", "whatsapp", "call", "instagram", "facebook"],
            ))
            .await?;
        manager
            .create_type(enum_type(
                "callback_status",
                &["pending", "called", "no-answer", "interested", "not-interested"],
            ))
            .await?;
        manager
            .create_type(enum_type(
                "callback_source",
                &["website", "popup", "package-page", "footer"],
            ))
            .await?;

        // users
        let mut users = Table::create();
        users
            .table(Users::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Users::Id)
                    .big_integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(Users::Name).string_len(100).not_null())
            .col(ColumnDef::new(Users::Email).string_len(255).not_null())
            .col(ColumnDef::new(Users::PasswordHash).string_len(255).not_null())
            .col(ColumnDef::new(Users::Phone).string_len(20).not_null())
            .col(
                ColumnDef::new(Users::IsEmailVerified)
                    .boolean()
                    .not_null()
                    .default(false),
            )
            .col(ColumnDef::new(Users::ReferralCode).string_len(16).not_null())
            .col(ColumnDef::new(Users::ReferredBy).big_integer().null())
            .col(
                ColumnDef::new(Users::WalletBalance)
                    .big_integer()
                    .not_null()
                    .default(0)
                    .check(Expr::col(Users::WalletBalance).gte(0)),
            )
            .col(
                ColumnDef::new(Users::Role)
                    .custom(Alias::new("user_role"))
                    .not_null()
                    .default(Expr::cust("'user'::user_role")),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_users_referred_by")
                    .from(Users::Table, Users::ReferredBy)
                    .to(Users::Table, Users::Id)
                    .on_delete(ForeignKeyAction::SetNull),
            );
        timestamps(&mut users, Users::CreatedAt, Users::UpdatedAt);
        manager.create_table(users.to_owned()).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_users_referral_code")
                    .table(Users::Table)
                    .col(Users::ReferralCode)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_referred_by")
                    .table(Users::Table)
                    .col(Users::ReferredBy)
                    .to_owned(),
            )
            .await?;

        // packages
        let mut packages = Table::create();
        packages
            .table(Packages::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Packages::Id)
                    .big_integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(Packages::Title).string_len(200).not_null())
            .col(ColumnDef::new(Packages::Slug).string_len(200).not_null())
            .col(ColumnDef::new(Packages::Description).text().null())
            .col(ColumnDef::new(Packages::Duration).string_len(50).null())
            .col(ColumnDef::new(Packages::CategoryAndPrice).json_binary().not_null())
            .col(ColumnDef::new(Packages::FeaturedImage).text().not_null())
            .col(ColumnDef::new(Packages::Destinations).json_binary().not_null())
            .col(ColumnDef::new(Packages::Itinerary).json_binary().not_null())
            .col(ColumnDef::new(Packages::Activities).json_binary().not_null())
            .col(ColumnDef::new(Packages::AvailableDates).json_binary().not_null())
            .col(
                ColumnDef::new(Packages::IsActive)
                    .boolean()
                    .not_null()
                    .default(true),
            );
        timestamps(&mut packages, Packages::CreatedAt, Packages::UpdatedAt);
        manager.create_table(packages.to_owned()).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_packages_slug")
                    .table(Packages::Table)
                    .col(Packages::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // enquiries
        let mut enquiries = Table::create();
        enquiries
            .table(Enquiries::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Enquiries::Id)
                    .big_integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(Enquiries::Name).string_len(100).not_null())
            .col(ColumnDef::new(Enquiries::Email).string_len(255).not_null())
            .col(ColumnDef::new(Enquiries::Phone).string_len(20).not_null())
            .col(
                ColumnDef::new(Enquiries::NoOfGuests)
                    .integer()
                    .not_null()
                    .check(Expr::col(Enquiries::NoOfGuests).gt(0)),
            )
            .col(ColumnDef::new(Enquiries::CheckInDate).date().not_null())
            .col(ColumnDef::new(Enquiries::CheckOutDate).date().not_null())
            .col(ColumnDef::new(Enquiries::PackageId).big_integer().null())
            .col(ColumnDef::new(Enquiries::Message).text().null())
            .col(
                ColumnDef::new(Enquiries::Status)
                    .custom(Alias::new("enquiry_status"))
                    .not_null()
                    .default(Expr::cust("'pending'::enquiry_status")),
            )
            .col(ColumnDef::new(Enquiries::AssignedTo).big_integer().null())
            .col(
                ColumnDef::new(Enquiries::Source)
                    .custom(Alias::new("enquiry_source"))
                    .not_null()
                    .default(Expr::cust("'website'::enquiry_source")),
            )
            .check(
                Expr::col(Enquiries::CheckOutDate).gt(Expr::col(Enquiries::CheckInDate)),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_enquiries_package")
                    .from(Enquiries::Table, Enquiries::PackageId)
                    .to(Packages::Table, Packages::Id)
                    .on_delete(ForeignKeyAction::SetNull),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_enquiries_assigned_to")
                    .from(Enquiries::Table, Enquiries::AssignedTo)
                    .to(Users::Table, Users::Id)
                    .on_delete(ForeignKeyAction::SetNull),
            );
        timestamps(&mut enquiries, Enquiries::CreatedAt, Enquiries::UpdatedAt);
        manager.create_table(enquiries.to_owned()).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_enquiries_status")
                    .table(Enquiries::Table)
                    .col(Enquiries::Status)
                    .to_owned(),
            )
            .await?;

        // callback requests
        let mut callbacks = Table::create();
        callbacks
            .table(CallbackRequests::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(CallbackRequests::Id)
                    .big_integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(CallbackRequests::Name).string_len(100).not_null())
            .col(ColumnDef::new(CallbackRequests::Phone).string_len(20).not_null())
            .col(ColumnDef::new(CallbackRequests::PreferredTime).string_len(100).null())
            .col(ColumnDef::new(CallbackRequests::Message).text().null())
            .col(ColumnDef::new(CallbackRequests::Destination).string_len(200).null())
            .col(
                ColumnDef::new(CallbackRequests::Status)
                    .custom(Alias::new("callback_status"))
                    .not_null()
                    .default(Expr::cust("'pending'::callback_status")),
            )
            .col(
                ColumnDef::new(CallbackRequests::CalledAt)
                    .timestamp_with_time_zone()
                    .null(),
            )
            .col(ColumnDef::new(CallbackRequests::AssignedTo).big_integer().null())
            .col(
                ColumnDef::new(CallbackRequests::Source)
                    .custom(Alias::new("callback_source"))
                    .not_null()
                    .default(Expr::cust("'website'::callback_source")),
            )
            .col(ColumnDef::new(CallbackRequests::IpAddress).string_len(64).null())
            .col(ColumnDef::new(CallbackRequests::UserAgent).text().null())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_callback_requests_assigned_to")
                    .from(CallbackRequests::Table, CallbackRequests::AssignedTo)
                    .to(Users::Table, Users::Id)
                    .on_delete(ForeignKeyAction::SetNull),
            );
        timestamps(
            &mut callbacks,
            CallbackRequests::CreatedAt,
            CallbackRequests::UpdatedAt,
        );
        manager.create_table(callbacks.to_owned()).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_callback_requests_status")
                    .table(CallbackRequests::Table)
                    .col(CallbackRequests::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CallbackRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Enquiries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Packages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        for name in [
            "callback_source",
            "callback_status",
            "enquiry_source",
            "enquiry_status",
            "user_role",
        ] {
            manager
                .drop_type(Type::drop().name(Alias::new(name)).to_owned())
                .await?;
        }
        Ok(())
    }
}
