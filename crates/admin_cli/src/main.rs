use std::error::Error;

use clap::{Parser, Subcommand};
use engine::Engine;
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection, EntityTrait, Set};

mod password;

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub username: String,
        pub password: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub(crate) type BoxError = Box<dyn Error + Send + Sync>;

/// Bootstrap users and hangouts directly against the database.
#[derive(Parser, Debug)]
#[command(name = "settle_admin")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./settle.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a login; the password is prompted for.
    AddUser {
        #[arg(long)]
        username: String,
    },
    /// Create a hangout and print its join code.
    NewHangout {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Add an existing user to a hangout.
    Join {
        #[arg(long)]
        code: String,
        #[arg(long)]
        username: String,
    },
}

async fn add_user(db: &DatabaseConnection, username: &str) -> Result<(), BoxError> {
    let username = username.trim();
    if username.is_empty() {
        return Err("username must not be empty".into());
    }
    if users::Entity::find_by_id(username.to_string())
        .one(db)
        .await?
        .is_some()
    {
        return Err(format!("user already exists: {username}").into());
    }

    let password = password::read_new_password()?;
    users::Entity::insert(users::ActiveModel {
        username: Set(username.to_string()),
        password: Set(password),
    })
    .exec(db)
    .await?;
    println!("created user: {username}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();

    let db = Database::connect(&cli.database_url).await?;
    migration::Migrator::up(&db, None).await?;

    match cli.command {
        Command::AddUser { username } => add_user(&db, &username).await?,
        Command::NewHangout {
            owner,
            name,
            description,
        } => {
            let engine = Engine::builder().database(db).build().await?;
            let code = engine
                .create_hangout(&name, description.as_deref(), &owner)
                .await?;
            println!("created hangout: {name} ({code})");
        }
        Command::Join { code, username } => {
            let engine = Engine::builder().database(db).build().await?;
            engine.join_hangout(&code, &username).await?;
            println!("{username} joined hangout {code}");
        }
    }

    Ok(())
}
