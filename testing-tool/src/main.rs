use colored::*;
use serde_json::{json, Value};
use std::io::{self, Write};

const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "🚐 VanControl Testing Tool".bright_blue().bold());
    println!("{}", "=====================================".bright_blue());
    println!();

    let base_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let client = reqwest::Client::new();

    // Paso 1: Pedir credenciales
    let credentials = get_credentials()?;

    // Paso 2: Autenticarse y obtener token
    let session = authenticate(&client, &base_url, &credentials).await?;
    println!(
        "{} {} ({})",
        "✅ Login exitoso:".bright_green(),
        credentials.email,
        session.role.bright_yellow()
    );

    // Paso 3: Menú principal
    loop {
        println!();
        println!("{}", "📋 MENÚ PRINCIPAL".bright_green().bold());
        println!("{}", "==================".bright_green());
        println!("1. 🗺️  Listar rutas");
        println!("2. 📍 Publicar ruta");
        println!("3. 🗑️  Eliminar ruta");
        println!("4. 💺 Ver mapa de asientos");
        println!("5. ✋ Reservar asiento");
        println!("6. 🎬 Ejecutar escenario de demostración");
        println!("7. 🚪 Salir");
        print!("{}", "Selecciona una opción (1-7): ".bright_yellow());
        io::stdout().flush()?;

        let mut choice = String::new();
        io::stdin().read_line(&mut choice)?;
        let choice = choice.trim();

        let result = match choice {
            "1" => list_routes(&client, &base_url).await,
            "2" => publish_route(&client, &base_url, &session.token).await,
            "3" => delete_route(&client, &base_url, &session.token).await,
            "4" => show_seat_map(&client, &base_url).await,
            "5" => claim_seat(&client, &base_url, &session.token).await,
            "6" => run_demo_scenario(&client, &base_url).await,
            "7" => {
                println!("{}", "👋 ¡Hasta luego!".bright_blue());
                return Ok(());
            }
            _ => {
                println!("{}", "⚠️ Opción inválida".bright_red());
                Ok(())
            }
        };

        if let Err(e) = result {
            println!("{} {}", "❌ Error:".bright_red(), e);
        }
    }
}

struct Credentials {
    email: String,
    password: String,
}

struct Session {
    token: String,
    role: String,
}

fn get_credentials() -> io::Result<Credentials> {
    print!("{}", "Email: ".bright_yellow());
    io::stdout().flush()?;
    let mut email = String::new();
    io::stdin().read_line(&mut email)?;

    print!("{}", "Contraseña: ".bright_yellow());
    io::stdout().flush()?;
    let mut password = String::new();
    io::stdin().read_line(&mut password)?;

    Ok(Credentials {
        email: email.trim().to_string(),
        password: password.trim().to_string(),
    })
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{}", format!("{}: ", label).bright_yellow());
    io::stdout().flush()?;
    let mut value = String::new();
    io::stdin().read_line(&mut value)?;
    Ok(value.trim().to_string())
}

async fn authenticate(
    client: &reqwest::Client,
    base_url: &str,
    credentials: &Credentials,
) -> anyhow::Result<Session> {
    let response = client
        .post(format!("{}/api/auth/login", base_url))
        .json(&json!({
            "email": credentials.email,
            "password": credentials.password,
        }))
        .send()
        .await?;

    let status = response.status();
    let body: Value = response.json().await?;
    if !status.is_success() {
        anyhow::bail!(
            "login falló ({}): {}",
            status,
            body["message"].as_str().unwrap_or("sin mensaje")
        );
    }

    Ok(Session {
        token: body["token"].as_str().unwrap_or_default().to_string(),
        role: body["user"]["role"].as_str().unwrap_or("?").to_string(),
    })
}

async fn list_routes(client: &reqwest::Client, base_url: &str) -> anyhow::Result<()> {
    let body: Value = client
        .get(format!("{}/api/route", base_url))
        .send()
        .await?
        .json()
        .await?;

    let routes = body["routes"].as_array().cloned().unwrap_or_default();
    if routes.is_empty() {
        println!("{}", "Ninguna ruta registrada.".bright_yellow());
        return Ok(());
    }

    println!("{}", format!("🗺️ {} ruta(s):", routes.len()).bright_green());
    for route in routes {
        println!(
            "   {} - {} (lat: {}, lon: {})",
            route["id"].as_str().unwrap_or("?"),
            route["name"].as_str().unwrap_or("?").bright_white().bold(),
            route["latitude"],
            route["longitude"],
        );
    }
    Ok(())
}

async fn publish_route(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
) -> anyhow::Result<()> {
    let name = prompt("Nombre de la ruta")?;
    let latitude: f64 = prompt("Latitud")?.parse()?;
    let longitude: f64 = prompt("Longitud")?.parse()?;

    let response = client
        .post(format!("{}/api/route", base_url))
        .bearer_auth(token)
        .json(&json!({ "name": name, "latitude": latitude, "longitude": longitude }))
        .send()
        .await?;

    print_api_result(response).await
}

async fn delete_route(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
) -> anyhow::Result<()> {
    let id = prompt("Id de la ruta")?;
    let response = client
        .delete(format!("{}/api/route/{}", base_url, id))
        .bearer_auth(token)
        .send()
        .await?;

    print_api_result(response).await
}

async fn show_seat_map(client: &reqwest::Client, base_url: &str) -> anyhow::Result<()> {
    let id = prompt("Id de la ruta")?;
    let response = client
        .get(format!("{}/api/route/{}/seats", base_url, id))
        .send()
        .await?;

    let status = response.status();
    let body: Value = response.json().await?;
    if !status.is_success() {
        anyhow::bail!("{}", body["message"].as_str().unwrap_or("request falló"));
    }

    println!(
        "{}",
        format!("💺 Ocupados: {}", body["occupied_count"]).bright_green()
    );
    for seat in body["seats"].as_array().cloned().unwrap_or_default() {
        let index = seat["index"].as_u64().unwrap_or(0);
        if seat["occupied"].as_bool().unwrap_or(false) {
            println!(
                "   Asiento {:2} {} ({})",
                index,
                "OCUPADO".bright_red(),
                seat["occupant_id"].as_str().unwrap_or("?")
            );
        } else {
            println!("   Asiento {:2} {}", index, "libre".bright_green());
        }
    }
    Ok(())
}

async fn claim_seat(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
) -> anyhow::Result<()> {
    let id = prompt("Id de la ruta")?;
    let index: usize = prompt("Índice de asiento (0-11)")?.parse()?;

    let response = client
        .post(format!("{}/api/route/{}/seats/{}", base_url, id, index))
        .bearer_auth(token)
        .send()
        .await?;

    print_api_result(response).await
}

/// Escenario de demostración: el conductor demo publica una ruta y dos
/// pasajeros demo pelean por el mismo asiento.
async fn run_demo_scenario(client: &reqwest::Client, base_url: &str) -> anyhow::Result<()> {
    println!("{}", "🎬 Escenario: conflicto por el asiento 5".bright_blue());

    let driver = authenticate(
        client,
        base_url,
        &Credentials {
            email: "carlos@vancontrol.app".to_string(),
            password: "motorista123".to_string(),
        },
    )
    .await?;
    let ana = authenticate(
        client,
        base_url,
        &Credentials {
            email: "ana@vancontrol.app".to_string(),
            password: "passageira123".to_string(),
        },
    )
    .await?;
    let bruno = authenticate(
        client,
        base_url,
        &Credentials {
            email: "bruno@vancontrol.app".to_string(),
            password: "passageiro123".to_string(),
        },
    )
    .await?;

    // Nombre único para poder repetir el escenario contra el mismo server
    let name = format!("Rota demo {}", std::process::id());
    let body: Value = client
        .post(format!("{}/api/route", base_url))
        .bearer_auth(&driver.token)
        .json(&json!({ "name": name, "latitude": -23.5, "longitude": -46.6 }))
        .send()
        .await?
        .json()
        .await?;
    let route_id = body["data"]["id"].as_str().unwrap_or_default().to_string();
    println!("   📍 Ruta '{}' publicada ({})", name, route_id);

    let first = client
        .post(format!("{}/api/route/{}/seats/5", base_url, route_id))
        .bearer_auth(&ana.token)
        .send()
        .await?;
    println!(
        "   ✋ Ana reclama el asiento 5: {}",
        status_label(first.status().is_success())
    );

    let second = client
        .post(format!("{}/api/route/{}/seats/5", base_url, route_id))
        .bearer_auth(&bruno.token)
        .send()
        .await?;
    let conflict: Value = second.json().await?;
    println!(
        "   ✋ Bruno reclama el asiento 5: {} ({})",
        status_label(false),
        conflict["code"].as_str().unwrap_or("?").bright_yellow()
    );

    println!("{}", "🎬 Escenario completado".bright_blue());
    Ok(())
}

fn status_label(success: bool) -> ColoredString {
    if success {
        "ÉXITO".bright_green()
    } else {
        "RECHAZADO".bright_red()
    }
}

async fn print_api_result(response: reqwest::Response) -> anyhow::Result<()> {
    let status = response.status();
    let body: Value = response.json().await?;

    if status.is_success() {
        let message = body["message"].as_str().unwrap_or("OK");
        println!("{} {}", "✅".bright_green(), message);
        if let Some(id) = body["data"]["id"].as_str() {
            println!("   id: {}", id);
        }
    } else {
        println!(
            "{} {} ({})",
            "❌".bright_red(),
            body["message"].as_str().unwrap_or("request falló"),
            body["code"].as_str().unwrap_or("?").bright_yellow()
        );
    }
    Ok(())
}
