//! Initial schema: locations, actors with role sets, budgets, expense
//! claims and notifications.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(SCHEMA_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS notifications, expense_claims, budgets, user_roles, users, locations CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const SCHEMA_SQL: &str = r"
CREATE TABLE locations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    city VARCHAR(255) NOT NULL,
    monthly_petty_cash_limit NUMERIC(19, 4),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_petty_cash_positive CHECK (monthly_petty_cash_limit IS NULL OR monthly_petty_cash_limit > 0)
);

CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    location_id UUID NOT NULL REFERENCES locations(id),
    email VARCHAR(255) NOT NULL UNIQUE,
    full_name VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_users_location ON users(location_id) WHERE is_active;

-- An actor holds any number of roles at once
CREATE TABLE user_roles (
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    role VARCHAR(32) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (user_id, role),
    CONSTRAINT chk_role CHECK (role IN ('SUPER_ADMIN', 'ADMIN', 'BUSINESS_MANAGER', 'ACCOUNTANT', 'CASHIER'))
);

CREATE INDEX idx_user_roles_role ON user_roles(role);

CREATE TABLE budgets (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    location_id UUID NOT NULL REFERENCES locations(id),
    month INTEGER NOT NULL,
    year INTEGER NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    categories JSONB NOT NULL DEFAULT '{}'::jsonb,
    status VARCHAR(16) NOT NULL DEFAULT 'PENDING',
    created_by UUID NOT NULL REFERENCES users(id),
    approved_by UUID REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    version BIGINT NOT NULL DEFAULT 0,
    CONSTRAINT uq_budgets_period UNIQUE (location_id, month, year),
    CONSTRAINT chk_budget_month CHECK (month BETWEEN 1 AND 12),
    CONSTRAINT chk_budget_amount CHECK (amount > 0),
    CONSTRAINT chk_budget_status CHECK (status IN ('PENDING', 'APPROVED', 'REJECTED'))
);

CREATE TABLE expense_claims (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    expense_type VARCHAR(32) NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    details TEXT NOT NULL,
    disburse_type VARCHAR(32) NOT NULL,
    status VARCHAR(16) NOT NULL DEFAULT 'PENDING',
    location_id UUID NOT NULL REFERENCES locations(id),
    period_month INTEGER NOT NULL,
    period_year INTEGER NOT NULL,
    route_id VARCHAR(64),
    vehicle_id VARCHAR(64),
    attachments JSONB NOT NULL DEFAULT '[]'::jsonb,
    created_by UUID NOT NULL REFERENCES users(id),
    approved_by UUID REFERENCES users(id),
    approved_at TIMESTAMPTZ,
    rejected_by UUID REFERENCES users(id),
    rejected_at TIMESTAMPTZ,
    disbursed_by UUID REFERENCES users(id),
    disbursed_at TIMESTAMPTZ,
    account_title VARCHAR(255),
    account_no VARCHAR(64),
    bank_name VARCHAR(255),
    cheque_date DATE,
    disbursed_amount NUMERIC(19, 4),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    version BIGINT NOT NULL DEFAULT 0,
    CONSTRAINT chk_claim_amount CHECK (amount > 0),
    CONSTRAINT chk_claim_month CHECK (period_month BETWEEN 1 AND 12),
    CONSTRAINT chk_claim_status CHECK (status IN ('PENDING', 'APPROVED', 'REJECTED', 'DISBURSED')),
    CONSTRAINT chk_disburse_type CHECK (disburse_type IN ('CASH', 'CHEQUE_OR_TRANSFER')),
    CONSTRAINT chk_disbursed_amount CHECK (disbursed_amount IS NULL OR disbursed_amount > 0)
);

-- Spend per location and period
CREATE INDEX idx_claims_period ON expense_claims(location_id, period_year, period_month) WHERE status <> 'REJECTED';

CREATE INDEX idx_claims_location_created ON expense_claims(location_id, created_at DESC);

CREATE TABLE notifications (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title VARCHAR(255) NOT NULL,
    message TEXT NOT NULL,
    link VARCHAR(255),
    is_read BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_notifications_inbox ON notifications(user_id, created_at DESC);
";
