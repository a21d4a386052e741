use crate::auth;
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use thiserror::Error;

#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct TrackerUser {
    pub id: i32,
    pub name: String,
    pub email: String,
}

#[cfg_attr(test, derive(Clone))]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub mod driven_ports {
    use super::*;

    /// Insert payload for the user table. The password arrives already
    /// hashed; driven adapters never see plaintext credentials.
    pub struct NewUserRecord<'fields> {
        pub name: &'fields str,
        pub email: &'fields str,
        pub password_hash: &'fields str,
    }

    pub trait UserReader {
        async fn user_by_id(
            &self,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<TrackerUser>, anyhow::Error>;
    }

    pub trait UserWriter {
        async fn create_user(
            &self,
            user: &NewUserRecord<'_>,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<i32, anyhow::Error>;
    }

    pub trait DetectUser {
        async fn user_exists(
            &self,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error>;

        async fn user_with_email_exists(
            &self,
            email: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;

    #[derive(Debug, Error)]
    pub enum CreateUserError {
        #[error("A user with the given email address is already registered.")]
        EmailAlreadyRegistered,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }


    pub trait UserPort {
        async fn get_user(
            &self,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            u_reader: &impl driven_ports::UserReader,
        ) -> Result<Option<TrackerUser>, anyhow::Error>;

        async fn create_user(
            &self,
            new_user: &CreateUser,
            ext_cxn: &mut impl ExternalConnectivity,
            u_writer: &impl driven_ports::UserWriter,
            u_detect: &impl driven_ports::DetectUser,
        ) -> Result<i32, CreateUserError>;
    }
}

pub struct UserService {}

#[derive(Debug, Error)]
pub(super) enum UserExistsErr {
    #[error("user with ID {0} does not exist")]
    UserDoesNotExist(i32),

    #[error(transparent)]
    PortError(#[from] anyhow::Error),
}

pub(super) async fn verify_user_exists(
    id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    user_detect: &impl driven_ports::DetectUser,
) -> Result<(), UserExistsErr> {
    let does_user_exist = user_detect.user_exists(id, ext_cxn).await?;

    if does_user_exist {
        Ok(())
    } else {
        Err(UserExistsErr::UserDoesNotExist(id))
    }
}

impl driving_ports::UserPort for UserService {
    async fn get_user(
        &self,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        u_reader: &impl driven_ports::UserReader,
    ) -> Result<Option<TrackerUser>, anyhow::Error> {
        let user = u_reader
            .user_by_id(user_id, &mut *ext_cxn)
            .await
            .context("Fetching a user by ID")?;

        Ok(user)
    }

    async fn create_user(
        &self,
        new_user: &CreateUser,
        ext_cxn: &mut impl ExternalConnectivity,
        u_writer: &impl driven_ports::UserWriter,
        u_detect: &impl driven_ports::DetectUser,
    ) -> Result<i32, driving_ports::CreateUserError> {
        let email_taken = u_detect
            .user_with_email_exists(&new_user.email, &mut *ext_cxn)
            .await
            .context("Looking up email during signup")?;
        if email_taken {
            return Err(driving_ports::CreateUserError::EmailAlreadyRegistered);
        }

        let password_hash = auth::hash_password(&new_user.password)
            .context("Hashing the password of a new user")?;
        let record = driven_ports::NewUserRecord {
            name: &new_user.name,
            email: &new_user.email,
            password_hash: &password_hash,
        };

        Ok(u_writer
            .create_user(&record, &mut *ext_cxn)
            .await
            .context("Creating a user at the service level")?)
    }
}
