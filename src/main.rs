use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use tripffer_client::forms::{
    BookingForm, LoginForm, RegisterForm, RescheduleForm, ReviewForm, SearchForm,
};
use tripffer_client::models::{Booking, Hotel, Id, Role};
use tripffer_client::pages::View;
use tripffer_client::resources::FavoriteToggle;
use tripffer_client::routes::SearchQuery;
use tripffer_client::widgets::{paginate, star_rating};
use tripffer_client::{ClientConfig, Form, FormController, TripfferClient};

#[derive(Parser)]
#[command(name = "tripffer", about = "Search hotels and manage bookings on Tripffer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        remember: bool,
    },
    /// Forget the stored session
    Logout,
    /// Create a guest account, or a hotel account when --hotel-name is given
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        hotel_name: Option<String>,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        website: String,
        /// Repeat for each amenity; hotel accounts need at least one
        #[arg(long = "amenity")]
        amenities: Vec<String>,
    },
    Whoami,
    Search {
        #[arg(long)]
        destination: Option<String>,
        #[arg(long)]
        check_in: Option<String>,
        #[arg(long)]
        check_out: Option<String>,
        #[arg(long, default_value_t = 1)]
        adults: u32,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Show one hotel with its rooms and reviews
    Hotel { id: Id },
    Book {
        #[arg(long)]
        room: Id,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    Bookings {
        #[arg(long, conflicts_with = "past")]
        upcoming: bool,
        #[arg(long)]
        past: bool,
    },
    Cancel { id: Id },
    Reschedule {
        id: Id,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    Favorites,
    /// Add or remove a hotel from favorites
    Favorite { hotel_id: Id },
    Review {
        hotel_id: Id,
        #[arg(long)]
        rating: u8,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Resolve an app path such as /hotel/search/4 and load its data
    Route { path: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env().context("Failed to load configuration")?;
    let client = TripfferClient::new(config).context("Failed to initialize client")?;
    let today = Local::now().date_naive();

    match cli.command {
        Command::Login {
            email,
            password,
            remember,
        } => {
            let user = submit(
                &client,
                LoginForm {
                    email,
                    password,
                    remember_me: remember,
                },
            )
            .await?;
            println!("Signed in as {} <{}>", user.full_name(), user.email);
        }
        Command::Logout => {
            client.logout()?;
            println!("Signed out");
        }
        Command::Register {
            first_name,
            last_name,
            email,
            password,
            hotel_name,
            address,
            website,
            amenities,
        } => {
            let role = if hotel_name.is_some() { Role::Hotel } else { Role::User };
            let form = RegisterForm {
                first_name,
                last_name,
                email,
                password_confirm: password.clone(),
                password,
                role,
                hotel_name: hotel_name.unwrap_or_default(),
                address,
                website,
                amenities,
                ..RegisterForm::default()
            };
            let user = submit(&client, form).await?;
            println!("Registered {}. Sign in to continue.", user.email);
        }
        Command::Whoami => {
            require_session(&client)?;
            let user = client.current_user().await?;
            println!("{} <{}> ({:?})", user.full_name(), user.email, user.role);
        }
        Command::Search {
            destination,
            check_in,
            check_out,
            adults,
            page,
        } => {
            let query = SearchQuery {
                destination,
                check_in,
                check_out,
                adults: Some(adults),
            };
            let form: SearchForm = query.to_form();
            let hotels = submit(&client, form).await?;
            let results = paginate(hotels, page, client.config().items_per_page);
            for hotel in &results.items {
                print_hotel_line(hotel, &client.config().default_currency);
            }
            println!(
                "Page {}/{} ({} hotels)",
                results.page, results.total_pages, results.total_items
            );
        }
        Command::Hotel { id } => {
            let view = client.load_hotel_details(id).await?;
            print_hotel_line(&view.hotel, &client.config().default_currency);
            if let Some(description) = &view.hotel.description {
                println!("  {}", description);
            }
            for room in &view.hotel.rooms {
                println!(
                    "  room {} {} beds:{} adults:{} {:.2} {}",
                    room.id,
                    room.room_type,
                    room.bed_count,
                    room.max_adults,
                    room.price,
                    client.config().default_currency
                );
            }
            for review in &view.reviews {
                println!(
                    "  {} {} {}",
                    star_rating(review.rating as f64),
                    review.user,
                    review.comment.as_deref().unwrap_or_default()
                );
            }
            if view.is_favorite == Some(true) {
                println!("  in your favorites");
            }
        }
        Command::Book { room, from, to } => {
            require_session(&client)?;
            let booking = submit(
                &client,
                BookingForm {
                    room_id: room,
                    start_date: from,
                    end_date: to,
                },
            )
            .await?;
            print_booking(&booking);
        }
        Command::Bookings { upcoming, past } => {
            require_session(&client)?;
            let view = client.load_bookings(today).await?;
            let bookings = if upcoming {
                view.upcoming
            } else if past {
                view.past
            } else {
                view.all
            };
            if bookings.is_empty() {
                println!("No bookings");
            }
            bookings.iter().for_each(print_booking);
        }
        Command::Cancel { id } => {
            require_session(&client)?;
            client.cancel_booking(id).await?;
            println!("Booking {} cancelled", id);
        }
        Command::Reschedule { id, from, to } => {
            require_session(&client)?;
            let booking = submit(
                &client,
                RescheduleForm {
                    booking_id: id,
                    start_date: from,
                    end_date: to,
                },
            )
            .await?;
            print_booking(&booking);
        }
        Command::Favorites => {
            require_session(&client)?;
            for favorite in client.favorites().await? {
                print_hotel_line(&favorite.hotel, &client.config().default_currency);
            }
        }
        Command::Favorite { hotel_id } => {
            require_session(&client)?;
            match client.toggle_favorite(hotel_id).await? {
                FavoriteToggle::Added(_) => println!("Hotel {} added to favorites", hotel_id),
                FavoriteToggle::Removed { .. } => {
                    println!("Hotel {} removed from favorites", hotel_id)
                }
            }
        }
        Command::Review {
            hotel_id,
            rating,
            comment,
        } => {
            require_session(&client)?;
            let review = submit(
                &client,
                ReviewForm {
                    hotel_id,
                    rating,
                    comment,
                },
            )
            .await?;
            println!("Review {} posted {}", review.id, star_rating(review.rating as f64));
        }
        Command::Route { path } => print_view(client.load_route(&path, today).await?, today),
    }

    Ok(())
}

fn require_session(client: &TripfferClient) -> Result<()> {
    if !client.is_authenticated() {
        bail!("Not signed in. Run `tripffer login` first.");
    }
    Ok(())
}

// Runs a form through validation and submission, turning its error state
// into a readable failure
async fn submit<F: Form>(client: &TripfferClient, form: F) -> Result<F::Output> {
    let mut controller = FormController::new(form);
    if let Some(output) = controller.submit(client).await {
        return Ok(output);
    }

    let mut lines: Vec<String> = controller
        .errors()
        .iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect();
    if let Some(banner) = controller.banner() {
        lines.push(banner.to_string());
    }
    bail!(lines.join("\n"))
}

fn print_hotel_line(hotel: &Hotel, currency: &str) {
    let price = hotel
        .cheapest_room()
        .map(|room| room.price)
        .or(hotel.price_per_night)
        .map(|price| format!("from {:.2} {}", price, currency))
        .unwrap_or_default();
    println!(
        "{:>5} {} {} {} {}",
        hotel.id,
        star_rating(hotel.stars as f64),
        hotel.name,
        hotel.address,
        price
    );
}

fn print_booking(booking: &Booking) {
    println!(
        "{:>5} {} -> {} ({} nights) room {} {} {:.2}",
        booking.id,
        booking.start_date,
        booking.end_date,
        booking.nights(),
        booking.room.id,
        booking.status,
        booking.total_price
    );
}

fn print_view(view: View, today: NaiveDate) {
    match view {
        View::Redirect(route) => println!("redirect -> {}", route),
        View::NotFound(path) => println!("{}: page not found", path),
        View::Static(route) => println!("{}", route),
        View::Dashboard(dashboard) => {
            println!("Welcome, {}", dashboard.user.full_name());
            println!("Upcoming ({} as of {}):", dashboard.upcoming.len(), today);
            dashboard.upcoming.iter().for_each(print_booking);
            println!("Past:");
            dashboard.past.iter().for_each(print_booking);
            println!("Favorites: {}", dashboard.favorites.len());
        }
        View::Bookings(bookings) => bookings.all.iter().for_each(print_booking),
        View::Favorites(favorites) => {
            for favorite in favorites {
                println!("{:>5} {}", favorite.hotel.id, favorite.hotel.name);
            }
        }
        View::HotelDetails(details) => {
            println!(
                "{} {} ({} reviews)",
                details.hotel.name,
                star_rating(details.average_rating.unwrap_or_default()),
                details.reviews.len()
            );
        }
        View::HotelDashboard(dashboard) => {
            println!(
                "{}: {} rooms, {} bookings",
                dashboard.hotel.name,
                dashboard.rooms.len(),
                dashboard.bookings.len()
            );
        }
        View::Book(page) => {
            println!(
                "Book room {} at {} ({:.2} per night)",
                page.room.id, page.hotel.name, page.room.price
            );
        }
        View::Search(search) => {
            for hotel in &search.results.items {
                println!("{:>5} {}", hotel.id, hotel.name);
            }
        }
        View::Settings(settings) => {
            println!("{} <{}>", settings.user.full_name(), settings.user.email);
            if let Some(hotel) = settings.hotel {
                println!("Hotel: {}", hotel.name);
            }
        }
    }
}
