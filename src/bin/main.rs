use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinevault::config::Config;
use cinevault::friends::{FriendResponse, FriendStatus};
use cinevault::recent::{ItemKind, ItemRef};
use cinevault::store::Theme;
use cinevault::session::Session;
use cinevault::{Client, ClientError};

#[derive(Parser, Debug)]
#[command(name = "cinevault")]
#[command(about = "CineVault data client", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "cinevault.yaml")]
    config: String,
    /// Sign in before running the command.
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    password: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search movies, shows and users by partial match.
    Search { query: String },
    /// Show a movie's detail row.
    Movie { id: i64 },
    /// Show a show's detail row.
    Show { id: i64 },
    /// Print a random window of titles from the catalog.
    Discover,
    /// Record a detail-page visit and print the recent list.
    Visit { kind: ItemKind, id: i64 },
    /// Mark a movie or show as watched.
    Watch { kind: ItemKind, id: i64 },
    /// Print the signed-in user's recently visited items.
    Recent,
    /// Show another user's profile, watched lists and friend status.
    Profile { username: String },
    /// Send a friend request to a user.
    Befriend { username: String },
    /// Answer a pending friend request from a user.
    Respond {
        username: String,
        #[arg(long)]
        reject: bool,
    },
    /// Switch the signed-in user's theme preference.
    Theme { theme: String },
    /// Fetch recommendations seeded from the watched movie list.
    Recommend {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinevault=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), ClientError> {
    let config = Config::from_file(&args.config)?;
    let client = Client::new(&config)?;

    let session = match (&args.email, &args.password) {
        (Some(email), Some(password)) => Some(client.sign_in(email, password).await?),
        (None, None) => None,
        _ => {
            return Err(ClientError::Client(
                "both --email and --password are required to sign in".to_string(),
            ))
        }
    };

    match args.command {
        Command::Search { query } => {
            let results = client.catalog.search(&query).await?;
            for movie in &results.movies {
                println!("movie {:>8}  {}", movie.movie_id, movie.title);
            }
            for show in &results.shows {
                println!("show  {:>8}  {}", show.show_id, show.title);
            }
            for user in &results.users {
                println!("user  {}  {}", user.user_id, user.username);
            }
        }
        Command::Movie { id } => {
            let movie = client.catalog.movie(id).await?;
            println!("{} ({})", movie.title, movie.release_date.as_deref().unwrap_or("?"));
            if let Some(tagline) = &movie.tagline {
                println!("{}", tagline);
            }
            if let Some(overview) = &movie.overview {
                println!("{}", overview);
            }
        }
        Command::Show { id } => {
            let show = client.catalog.show(id).await?;
            println!("{} ({})", show.title, show.first_air_date.as_deref().unwrap_or("?"));
            if let Some(overview) = &show.overview {
                println!("{}", overview);
            }
        }
        Command::Discover => {
            for movie in client.catalog.discover().await? {
                println!("movie {:>8}  {}", movie.movie_id, movie.title);
            }
        }
        Command::Visit { kind, id } => {
            let session = require_session(&session)?;
            let set = client
                .recent
                .record_visit(&session.user_id, &ItemRef { kind, id })
                .await?;
            for item in set.items() {
                println!("{}", item);
            }
        }
        Command::Watch { kind, id } => {
            let session = require_session(&session)?;
            match kind {
                ItemKind::Movie => client.watched.mark_movie_watched(&session.user_id, id).await?,
                ItemKind::Show => client.watched.mark_show_watched(&session.user_id, id).await?,
            }
            println!("marked {} {} as watched", kind, id);
        }
        Command::Recent => {
            let session = require_session(&session)?;
            match client.recent.recent_items(&session.user_id).await {
                Ok(items) => {
                    for item in items {
                        println!("{}", item);
                    }
                }
                // No row yet is the same as nothing visited.
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e.into()),
            }
        }
        Command::Profile { username } => {
            let user = client.catalog.user(&username).await?;
            println!("{}", user.username);
            if let Some(bio) = &user.bio {
                println!("{}", bio);
            }
            let (movies, shows) = client.watched.watched_counts(&user.user_id).await?;
            println!("watched: {} movies, {} shows", movies, shows);
            for movie in client.watched.watched_movies(&user.user_id).await? {
                println!("movie {:>8}  {}", movie.movie_id, movie.title);
            }
            for show in client.watched.watched_shows(&user.user_id).await? {
                println!("show  {:>8}  {}", show.show_id, show.title);
            }
            if let Some(session) = &session {
                if session.user_id != user.user_id {
                    let status = client.friends.status(&session.user_id, &user.user_id).await?;
                    println!("friend status: {}", status_label(status));
                }
            }
        }
        Command::Befriend { username } => {
            let session = require_session(&session)?;
            let user = client.catalog.user(&username).await?;
            client
                .friends
                .send_request(&session.user_id, &user.user_id)
                .await?;
            println!("friend request sent to {}", user.username);
        }
        Command::Respond { username, reject } => {
            let session = require_session(&session)?;
            let user = client.catalog.user(&username).await?;
            let response = if reject {
                FriendResponse::Reject
            } else {
                FriendResponse::Accept
            };
            client
                .friends
                .respond(&session.user_id, &user.user_id, response)
                .await?;
            if reject {
                println!("rejected friend request from {}", user.username);
            } else {
                println!("accepted friend request from {}", user.username);
            }
        }
        Command::Theme { theme } => {
            let session = require_session(&session)?;
            let theme = match theme.as_str() {
                "dark" => Theme::Dark,
                "light" => Theme::Light,
                other => {
                    return Err(ClientError::Client(format!(
                        "unknown theme: {} (expected dark or light)",
                        other
                    )))
                }
            };
            client.set_theme(&session.user_id, theme).await?;
        }
        Command::Recommend { limit } => {
            let session = require_session(&session)?;
            let recommend = client.recommend.as_ref().ok_or_else(|| {
                ClientError::Client("no recommend endpoint configured".to_string())
            })?;
            let seeds: Vec<String> = client
                .watched
                .watched_movies(&session.user_id)
                .await?
                .into_iter()
                .map(|m| m.title)
                .collect();
            for rec in recommend.recommend(&seeds, limit).await? {
                match rec.score {
                    Some(score) => println!("{:.3}  {}", score, rec.title),
                    None => println!("       {}", rec.title),
                }
            }
        }
    }

    Ok(())
}

fn require_session<'a>(session: &'a Option<Session>) -> Result<&'a Session, ClientError> {
    session.as_ref().ok_or_else(|| {
        ClientError::Client("this command requires --email and --password".to_string())
    })
}

fn status_label(status: FriendStatus) -> &'static str {
    match status {
        FriendStatus::NotConnected => "not connected",
        FriendStatus::Friends => "friends",
        FriendStatus::RequestSent => "request sent",
        FriendStatus::RequestReceived => "request received",
        FriendStatus::RejectedByPeer => "request rejected",
        FriendStatus::PeerRejected => "rejected their request",
    }
}
