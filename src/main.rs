use clap::{Parser, Subcommand};
use interview_quiz::{
    db::Db,
    email::ResendEmailSender,
    models::NewUser,
    router,
    services::auth::{AuthService, CreateAdminOutcome, EmailSender},
    AppState,
};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// SQLite database URL, e.g. `sqlite://quiz.db`.
    #[arg(long, env, default_value = "sqlite://interview_quiz.db")]
    database_url: String,

    #[command(flatten)]
    serve: ServeArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web server (default).
    Serve,
    /// Create an active administrator account.
    CreateAdmin {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "ADMIN_PASSWORD")]
        password: String,
    },
}

#[derive(clap::Args, Debug)]
struct ServeArgs {
    /// The address to bind to.
    #[arg(short, long, env, default_value = "127.0.0.1:1414")]
    address: String,

    /// Public URL used in activation links.
    #[arg(long, env, default_value = "http://127.0.0.1:1414")]
    base_url: String,

    /// Resend API key. Without it registration skips email verification.
    #[arg(long, env)]
    resend_api_key: Option<String>,

    /// Mailbox notified about new submissions.
    #[arg(long, env)]
    admin_email: Option<String>,

    /// Mark cookies `Secure` (serve over HTTPS).
    #[arg(long, env, default_value_t = false)]
    secure_cookies: bool,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "interview_quiz=debug,tower_http=info".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .init();

    let args = Args::parse();
    let db = Db::new(&args.database_url).await?;

    match args.command {
        Some(Command::CreateAdmin {
            username,
            email,
            password,
        }) => create_admin(db, username, email, password).await,
        Some(Command::Serve) | None => serve_app(db, args.serve).await,
    }
}

async fn create_admin(
    db: Db,
    username: String,
    email: String,
    password: String,
) -> color_eyre::Result<()> {
    let auth: AuthService =
        AuthService::new(db, ResendEmailSender::disabled(), String::new());

    let user = NewUser {
        first_name: username.clone(),
        last_name: username.clone(),
        username,
        email,
        password,
    };

    match auth.create_admin(&user).await? {
        CreateAdminOutcome::Created(id) => {
            tracing::info!("admin {} created with id={id}", user.username);
            Ok(())
        }
        CreateAdminOutcome::EmptyFields => {
            color_eyre::eyre::bail!("username, email and password must not be empty")
        }
        CreateAdminOutcome::WeakPassword => {
            color_eyre::eyre::bail!("the password must be at least 8 characters long")
        }
        CreateAdminOutcome::UsernameTaken => {
            color_eyre::eyre::bail!("a user named {} already exists", user.username)
        }
        CreateAdminOutcome::EmailTaken => {
            color_eyre::eyre::bail!("a user with email {} already exists", user.email)
        }
    }
}

async fn serve_app(db: Db, args: ServeArgs) -> color_eyre::Result<()> {
    let email = ResendEmailSender::new(args.resend_api_key, args.admin_email);
    if !email.is_enabled() {
        tracing::warn!("RESEND_API_KEY not set, new accounts are activated without email");
    }

    let state = AppState::new(db, email, args.base_url, args.secure_cookies);
    let app = router(state);

    let address = args.address.parse::<std::net::SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(address).await?;
    tracing::info!("listening on http://{address}");
    axum::serve(listener, app).await?;

    Ok(())
}
