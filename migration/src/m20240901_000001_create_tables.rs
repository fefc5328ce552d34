use sea_orm_migration::prelude::*;

// Enum columns are plain strings so the schema runs unchanged on Postgres and SQLite.

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    Role,
    IsActive,
    LoginAttempts,
    LockUntil,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    Title,
    Slug,
    Description,
    TargetAmount,
    RaisedAmount,
    Images,
    Status,
    Priority,
    IsMainEvent,
    EventDate,
    EndDate,
    Location,
    Category,
    DonationCount,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Donations {
    Table,
    Id,
    DonorName,
    Email,
    Phone,
    Amount,
    DonationType,
    EventId,
    RazorpayOrderId,
    RazorpayPaymentId,
    RazorpaySignature,
    PaymentMethod,
    PaymentStatus,
    TransactionDate,
    FailureReason,
    IsApproved,
    ApprovedBy,
    ApprovedAt,
    AdminNotes,
    EventCredited,
    ReceiptNumber,
    ReceiptGenerated,
    ReceiptGeneratedAt,
    EmailSent,
    IsAnonymous,
    IpAddress,
    UserAgent,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GalleryItems {
    Table,
    Id,
    Title,
    Description,
    Category,
    Images,
    IsPublic,
    IsPinned,
    EventId,
    UploadedBy,
    Date,
    Location,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string_len(20)
                            .not_null()
                            .default("admin"),
                    )
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Users::LoginAttempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::LockUntil)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Users::LastLogin)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Events::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Events::Title).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Events::Slug)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Events::Description).text().not_null())
                    .col(ColumnDef::new(Events::TargetAmount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Events::RaisedAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Events::Images).json().not_null())
                    .col(
                        ColumnDef::new(Events::Status)
                            .string_len(20)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Events::Priority)
                            .integer()
                            .not_null()
                            .default(5),
                    )
                    .col(
                        ColumnDef::new(Events::IsMainEvent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Events::EventDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Events::EndDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Events::Location).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Events::Category)
                            .string_len(20)
                            .not_null()
                            .default("Festival"),
                    )
                    .col(
                        ColumnDef::new(Events::DonationCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Events::CreatedBy).big_integer().null())
                    .col(
                        ColumnDef::new(Events::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Events::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Donations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Donations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Donations::DonorName).string_len(100).not_null())
                    .col(ColumnDef::new(Donations::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Donations::Phone).string_len(10).not_null())
                    .col(ColumnDef::new(Donations::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Donations::DonationType)
                            .string_len(20)
                            .not_null()
                            .default("general"),
                    )
                    .col(ColumnDef::new(Donations::EventId).big_integer().null())
                    .col(ColumnDef::new(Donations::RazorpayOrderId).string_len(255).null())
                    .col(ColumnDef::new(Donations::RazorpayPaymentId).string_len(255).null())
                    .col(ColumnDef::new(Donations::RazorpaySignature).string_len(255).null())
                    .col(ColumnDef::new(Donations::PaymentMethod).string_len(50).null())
                    .col(
                        ColumnDef::new(Donations::PaymentStatus)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Donations::TransactionDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Donations::FailureReason).text().null())
                    .col(
                        ColumnDef::new(Donations::IsApproved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Donations::ApprovedBy).big_integer().null())
                    .col(
                        ColumnDef::new(Donations::ApprovedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Donations::AdminNotes).text().null())
                    .col(
                        ColumnDef::new(Donations::EventCredited)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Donations::ReceiptNumber)
                            .string_len(40)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Donations::ReceiptGenerated)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Donations::ReceiptGeneratedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Donations::EmailSent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Donations::IsAnonymous)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Donations::IpAddress).string_len(64).null())
                    .col(ColumnDef::new(Donations::UserAgent).text().null())
                    .col(
                        ColumnDef::new(Donations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Donations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GalleryItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GalleryItems::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GalleryItems::Title).string_len(200).not_null())
                    .col(ColumnDef::new(GalleryItems::Description).text().null())
                    .col(ColumnDef::new(GalleryItems::Category).string_len(20).not_null())
                    .col(ColumnDef::new(GalleryItems::Images).json().not_null())
                    .col(
                        ColumnDef::new(GalleryItems::IsPublic)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(GalleryItems::IsPinned)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(GalleryItems::EventId).big_integer().null())
                    .col(ColumnDef::new(GalleryItems::UploadedBy).big_integer().not_null())
                    .col(
                        ColumnDef::new(GalleryItems::Date)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GalleryItems::Location).string_len(255).not_null())
                    .col(
                        ColumnDef::new(GalleryItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GalleryItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_events_status")
                    .table(Events::Table)
                    .col(Events::Status)
                    .to_owned(),
            )
            .await?;

        for (name, col) in [
            ("idx_donations_event", Donations::EventId),
            ("idx_donations_payment_status", Donations::PaymentStatus),
            ("idx_donations_order", Donations::RazorpayOrderId),
            ("idx_donations_payment", Donations::RazorpayPaymentId),
            ("idx_donations_created_at", Donations::CreatedAt),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(Donations::Table)
                        .col(col)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_gallery_category")
                    .table(GalleryItems::Table)
                    .col(GalleryItems::Category)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(GalleryItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Donations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Events::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
