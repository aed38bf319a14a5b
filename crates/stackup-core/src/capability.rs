//! Static capability table
//!
//! Maps each choice to the packages it pulls in. Every lookup is an exhaustive
//! `match`, so adding a variant to one of the choice enums fails to compile
//! until its packages are listed here.

use crate::config::{
    BackendFramework, Database, FrontendFramework, LanguageFamily, StateLibrary, Styling,
};

/// Required and development packages for a server framework
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageSet {
    pub required: &'static [&'static str],
    pub dev: &'static [&'static str],
}

/// Dev tooling added to a Node server written in TypeScript
pub const SERVER_TYPESCRIPT_TOOLING: &[&str] = &["typescript", "@types/node", "ts-node"];

/// Dev tooling added to a client written in TypeScript
pub const CLIENT_TYPESCRIPT_TOOLING: &[&str] = &["typescript"];

const TAILWIND: &[&str] = &["tailwindcss", "postcss", "autoprefixer"];

pub fn server_packages(framework: BackendFramework) -> PackageSet {
    match framework {
        BackendFramework::Express => PackageSet {
            required: &["express", "cors", "dotenv"],
            dev: &["nodemon", "@types/express", "@types/cors"],
        },
        BackendFramework::Nest => PackageSet {
            required: &[
                "@nestjs/core",
                "@nestjs/common",
                "@nestjs/platform-express",
            ],
            dev: &["@nestjs/cli", "@nestjs/schematics", "@nestjs/testing"],
        },
        BackendFramework::FastApi => PackageSet {
            required: &["fastapi", "uvicorn", "python-dotenv", "pydantic"],
            dev: &["pytest", "black", "flake8"],
        },
        BackendFramework::Django => PackageSet {
            required: &[
                "django",
                "djangorestframework",
                "django-cors-headers",
                "python-dotenv",
            ],
            dev: &["pytest", "pytest-django", "black", "flake8"],
        },
        BackendFramework::Flask => PackageSet {
            required: &["flask", "flask-cors", "python-dotenv"],
            dev: &["pytest", "black", "flake8"],
        },
    }
}

/// Driver packages for a database in the given language family
pub fn database_drivers(database: Database, family: LanguageFamily) -> &'static [&'static str] {
    match (database, family) {
        (Database::MongoDb, LanguageFamily::Node) => &["mongoose"],
        (Database::MongoDb, LanguageFamily::Python) => &["pymongo", "motor"],
        (Database::PostgreSql, LanguageFamily::Node) => &["pg", "sequelize"],
        (Database::PostgreSql, LanguageFamily::Python) => &["psycopg2-binary", "sqlalchemy"],
        (Database::MySql, LanguageFamily::Node) => &["mysql2", "sequelize"],
        (Database::MySql, LanguageFamily::Python) => &["mysql-connector-python", "sqlalchemy"],
        (Database::Sqlite, LanguageFamily::Node) => &["sqlite3", "sequelize"],
        (Database::Sqlite, LanguageFamily::Python) => &["sqlalchemy"],
    }
}

pub fn client_packages(framework: FrontendFramework) -> &'static [&'static str] {
    match framework {
        FrontendFramework::React => &["react-router-dom", "axios"],
        FrontendFramework::Vue => &["vue-router", "axios"],
        FrontendFramework::Svelte => &["svelte-navigator", "axios"],
        FrontendFramework::Angular => &["@angular/router", "axios"],
    }
}

/// Styling choices offered for a frontend framework, in prompt order
pub fn styling_options(framework: FrontendFramework) -> &'static [Styling] {
    match framework {
        FrontendFramework::React => &[
            Styling::Tailwind,
            Styling::Bootstrap,
            Styling::Mui,
            Styling::Chakra,
            Styling::StyledComponents,
        ],
        FrontendFramework::Vue => &[Styling::Tailwind, Styling::Bootstrap, Styling::Vuetify],
        FrontendFramework::Svelte => &[Styling::Tailwind],
        FrontendFramework::Angular => &[Styling::Tailwind, Styling::Bootstrap],
    }
}

/// State libraries offered for a frontend framework, in prompt order
pub fn state_options(framework: FrontendFramework) -> &'static [StateLibrary] {
    match framework {
        FrontendFramework::React => &[
            StateLibrary::Redux,
            StateLibrary::Zustand,
            StateLibrary::Recoil,
            StateLibrary::Jotai,
            StateLibrary::Context,
        ],
        FrontendFramework::Vue => &[StateLibrary::Pinia, StateLibrary::Vuex],
        FrontendFramework::Svelte => &[StateLibrary::SvelteStore],
        FrontendFramework::Angular => &[StateLibrary::Ngrx],
    }
}

/// Packages for a styling choice; `None` when the framework does not offer it
pub fn styling_packages(
    framework: FrontendFramework,
    styling: Styling,
) -> Option<&'static [&'static str]> {
    use FrontendFramework::*;
    let packages: &'static [&'static str] = match (framework, styling) {
        (_, Styling::Tailwind) => TAILWIND,
        (React, Styling::Bootstrap) => &["bootstrap", "react-bootstrap"],
        (Vue, Styling::Bootstrap) => &["bootstrap", "bootstrap-vue"],
        (Angular, Styling::Bootstrap) => &["bootstrap", "ngx-bootstrap"],
        (React, Styling::Mui) => &[
            "@mui/material",
            "@mui/icons-material",
            "@emotion/react",
            "@emotion/styled",
        ],
        (React, Styling::Chakra) => &[
            "@chakra-ui/react",
            "@emotion/react",
            "@emotion/styled",
            "framer-motion",
        ],
        (React, Styling::StyledComponents) => &["styled-components"],
        (Vue, Styling::Vuetify) => &["vuetify"],
        _ => return None,
    };
    Some(packages)
}

/// Packages for a state library; `None` when the framework does not offer it
pub fn state_packages(
    framework: FrontendFramework,
    state: StateLibrary,
) -> Option<&'static [&'static str]> {
    use FrontendFramework::*;
    let packages: &'static [&'static str] = match (framework, state) {
        (React, StateLibrary::Redux) => &["redux", "react-redux", "@reduxjs/toolkit"],
        (React, StateLibrary::Zustand) => &["zustand"],
        (React, StateLibrary::Recoil) => &["recoil"],
        (React, StateLibrary::Jotai) => &["jotai"],
        (React, StateLibrary::Context) => &[],
        (Vue, StateLibrary::Pinia) => &["pinia"],
        (Vue, StateLibrary::Vuex) => &["vuex"],
        (Svelte, StateLibrary::SvelteStore) => &[],
        (Angular, StateLibrary::Ngrx) => &["@ngrx/store", "@ngrx/effects", "@ngrx/entity"],
        _ => return None,
    };
    Some(packages)
}
